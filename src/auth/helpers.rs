//! Pure helper functions for authentication
//!
//! This module contains stateless helper functions for fragment parsing,
//! anti-forgery state generation, token fingerprints, and HTTP clients.

use std::collections::HashMap;
use std::time::Duration;

use oauth2::CsrfToken;

// =============================================================================
// Redirect Fragment
// =============================================================================

/// Parse a redirect fragment (`#a=1&b=2`, leading `#` optional) into a map.
///
/// Values are form-urlencoded. When a key repeats, the first value wins.
pub fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

// =============================================================================
// Anti-forgery State
// =============================================================================

/// Generate a fresh random state value for one login attempt
pub fn generate_state() -> String {
    CsrfToken::new_random().secret().clone()
}

// =============================================================================
// Logging
// =============================================================================

/// Short, non-reversible identifier for a token so logs can correlate
/// captures without ever printing the token itself
pub fn token_fingerprint(token: &str) -> String {
    let digest = format!("{:x}", md5::compute(token));
    digest[..12].to_string()
}

// =============================================================================
// HTTP Client Builders
// =============================================================================

/// Create a reqwest client for preferences API calls.
///
/// Only the connect phase is bounded; an established request runs until the
/// server answers or the connection drops.
pub fn create_http_client(connect_timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
}

// =============================================================================
// Tests
// =============================================================================
