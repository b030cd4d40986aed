use std::env;

use url::Url;

pub const DEFAULT_SCOPE: &str = "openid email profile";
pub const DEFAULT_RESPONSE_TYPE: &str = "token";
pub const DEFAULT_CALLBACK_PATH: &str = "/callback";
pub const DEFAULT_SESSION_STORE_PATH: &str = ".dev-portal/storage.json";

/// Routes the portal serves itself. The callback page cannot live on one of them.
pub const RESERVED_PATHS: &[&str] = &[
    "/healthz",
    "/readyz",
    "/auth/login",
    "/auth/fragment",
    "/auth/logout",
    "/auth/session",
    "/api/me",
    "/api/defaults",
    "/api/put",
    "/api/delete",
    "/api/children",
    "/api/results",
];

pub const STATIC_PREFIX: &str = "/static";

/// Why `path` cannot be mounted as the callback page, if it cannot.
///
/// `/` is accepted: the dashboard forwards sign-in fragments itself.
pub fn callback_path_conflict(path: &str) -> Option<String> {
    if RESERVED_PATHS.contains(&path) {
        return Some(format!("{} is already a portal route", path));
    }
    if path == STATIC_PREFIX || path.starts_with("/static/") {
        return Some(format!("{} is under the static asset directory", path));
    }
    // Router syntax for captures and wildcards
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Some(format!("{} contains a route parameter segment", path));
    }
    None
}

/// Identity provider and API settings used by the browser-facing flow.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortalConfig {
    pub cognito_domain: String,
    pub client_id: String,
    pub region: String,
    pub redirect_uri: String,
    pub scope: String,
    pub response_type: String,
    pub api_base_url: String,
}

impl PortalConfig {
    /// Names of the required settings that are empty.
    ///
    /// Login is refused while this list is non-empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("COGNITO_DOMAIN", &self.cognito_domain),
            ("COGNITO_CLIENT_ID", &self.client_id),
            ("COGNITO_REGION", &self.region),
            ("API_BASE_URL", &self.api_base_url),
            ("COGNITO_REDIRECT_URI", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Build the provider's `/oauth2/authorize` URL for one login attempt.
    ///
    /// Trailing slashes on the domain are stripped so the path never doubles up.
    /// Parameter values are form-urlencoded (spaces become `+`).
    pub fn build_authorize_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let domain = self.cognito_domain.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/oauth2/authorize", domain))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", &self.response_type)
            .append_pair("scope", &self.scope)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", state);

        Ok(url)
    }

    /// Path the provider redirects back to, taken from `redirect_uri`.
    ///
    /// `/` when the redirect URI points at the site root.
    pub fn callback_path(&self) -> String {
        Url::parse(&self.redirect_uri)
            .ok()
            .map(|u| u.path().to_string())
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_CALLBACK_PATH.to_string())
    }

    /// The dashboard itself receives the sign-in fragment
    pub fn callback_is_root(&self) -> bool {
        self.callback_path() == "/"
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Origin the browser sees; the default redirect URI hangs off it
    pub portal_public_url: String,

    // Outbound HTTP connect timeout (in seconds). There is no request timeout.
    pub http_connect_timeout_secs: u64,

    // Key/value store file. None keeps the session in memory only.
    pub session_store_path: Option<String>,

    pub portal: PortalConfig,
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary lookup.
    ///
    /// An unset variable falls back to its default; a variable set to the
    /// empty string stays empty (and may leave the portal misconfigured).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = lookup("SERVER_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(5173);

        // Derive the public origin from the bind address when not given,
        // e.g. 0.0.0.0:5173 -> http://localhost:5173
        let portal_public_url = match lookup("PORTAL_PUBLIC_URL") {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let host = match server_host.as_str() {
                    "0.0.0.0" | "::" => "localhost",
                    other => other,
                };
                format!("http://{}:{}", host, server_port)
            }
        };
        Url::parse(&portal_public_url).map_err(|e| {
            anyhow::anyhow!("PORTAL_PUBLIC_URL is not a valid URL ({}): {}", portal_public_url, e)
        })?;

        let http_connect_timeout_secs = lookup("HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        // Empty path disables persistence
        let session_store_path = match lookup("SESSION_STORE_PATH") {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(path),
            None => Some(DEFAULT_SESSION_STORE_PATH.to_string()),
        };

        let portal = PortalConfig {
            cognito_domain: lookup("COGNITO_DOMAIN").unwrap_or_default(),
            client_id: lookup("COGNITO_CLIENT_ID").unwrap_or_default(),
            region: lookup("COGNITO_REGION").unwrap_or_default(),
            redirect_uri: lookup("COGNITO_REDIRECT_URI")
                .unwrap_or_else(|| format!("{}{}", portal_public_url, DEFAULT_CALLBACK_PATH)),
            scope: lookup("COGNITO_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            response_type: lookup("COGNITO_RESPONSE_TYPE")
                .unwrap_or_else(|| DEFAULT_RESPONSE_TYPE.to_string()),
            api_base_url: lookup("API_BASE_URL").unwrap_or_default(),
        };

        let callback_path = portal.callback_path();
        if let Some(conflict) = callback_path_conflict(&callback_path) {
            anyhow::bail!(
                "COGNITO_REDIRECT_URI cannot be used as the callback page ({}): {}",
                portal.redirect_uri,
                conflict
            );
        }

        Ok(Config {
            server_host,
            server_port,
            portal_public_url,
            http_connect_timeout_secs,
            session_store_path,
            portal,
        })
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
