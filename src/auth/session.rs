//! Portal session: the identity token and the pending login attempt
//!
//! The token lives in memory and is mirrored into the key/value store so a
//! restart keeps the engineer logged in. The anti-forgery state value only
//! exists in the store, between `login` and the redirect back.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use super::helpers::{generate_state, parse_fragment, token_fingerprint};
use super::jwt::{decode_jwt, Claims};
use super::store::{KeyValueStore, StoreError};
use crate::config::PortalConfig;

pub const TOKEN_KEY: &str = "devPortal.idToken";
pub const STATE_KEY: &str = "devPortal.oauthState";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    LoggedOut,
    /// A state value is stored and the browser is at the provider
    PendingRedirect,
    LoggedIn,
}

/// What happened to a redirect fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentOutcome {
    TokenCaptured,
    /// The returned state does not match the stored one; nothing was adopted
    StateMismatch,
    NoToken,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Missing required config: {}. Check your environment variables.", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
    #[error("Invalid authorization URL: {0}")]
    InvalidAuthorizeUrl(#[from] url::ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Session {
    store: Arc<dyn KeyValueStore>,
    id_token: RwLock<Option<String>>,
}

impl Session {
    /// Create a session, restoring any token left in the store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let id_token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());

        if let Some(token) = id_token.as_deref() {
            tracing::info!(
                token_fingerprint = %token_fingerprint(token),
                "Restored identity token from session store"
            );
        }

        Self {
            store,
            id_token: RwLock::new(id_token),
        }
    }

    pub async fn id_token(&self) -> Option<String> {
        self.id_token.read().await.clone()
    }

    /// Claims of the current token, `None` when logged out or undecodable
    pub async fn claims(&self) -> Option<Claims> {
        self.id_token.read().await.as_deref().and_then(decode_jwt)
    }

    pub async fn auth_state(&self) -> AuthState {
        if self.id_token.read().await.is_some() {
            AuthState::LoggedIn
        } else if self.store.get(STATE_KEY).is_some() {
            AuthState::PendingRedirect
        } else {
            AuthState::LoggedOut
        }
    }

    /// Start a login attempt and return the URL the browser must navigate to.
    ///
    /// Refused without touching the store when the configuration is incomplete.
    pub fn login(&self, config: &PortalConfig) -> Result<Url, LoginError> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "Login refused: configuration incomplete");
            return Err(LoginError::MissingConfig(missing));
        }

        let state = generate_state();
        let authorize_url = config.build_authorize_url(&state)?;
        self.store.set(STATE_KEY, &state)?;

        tracing::info!(
            cognito_domain = %config.cognito_domain,
            client_id = %config.client_id,
            response_type = %config.response_type,
            "Redirecting to identity provider"
        );

        Ok(authorize_url)
    }

    /// Process the fragment the provider appended to the redirect URI.
    ///
    /// A leading `#` is optional.
    pub async fn capture_redirect(&self, fragment: &str) -> Result<FragmentOutcome, StoreError> {
        let params = parse_fragment(fragment);

        let incoming_state = params.get("state").filter(|s| !s.is_empty());
        let stored_state = self.store.get(STATE_KEY).filter(|s| !s.is_empty());

        if let (Some(incoming), Some(stored)) = (incoming_state, stored_state.as_ref()) {
            if incoming != stored {
                tracing::warn!("OAuth state mismatch, ignoring tokens");
                return Ok(FragmentOutcome::StateMismatch);
            }
        }

        let Some(token) = params.get("id_token").filter(|t| !t.is_empty()) else {
            tracing::debug!(
                param_count = params.len(),
                "Redirect fragment carried no id_token"
            );
            return Ok(FragmentOutcome::NoToken);
        };

        let mut id_token = self.id_token.write().await;
        self.store.set(TOKEN_KEY, token)?;
        *id_token = Some(token.clone());
        drop(id_token);

        // The token is already adopted, a stale state value only affects the next login
        if let Err(e) = self.store.remove(STATE_KEY) {
            tracing::warn!(error = %e, "Could not clear OAuth state after capturing token");
        }

        tracing::info!(
            token_fingerprint = %token_fingerprint(token),
            state_checked = stored_state.is_some(),
            "Identity token captured"
        );

        Ok(FragmentOutcome::TokenCaptured)
    }

    /// Drop the token from memory and the store. No provider call is made.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut id_token = self.id_token.write().await;
        self.store.remove(TOKEN_KEY)?;
        *id_token = None;

        tracing::info!("Logged out, identity token cleared");
        Ok(())
    }
}
