//! Authentication handlers for login, callback, and logout flows
//!
//! This module contains the Axum HTTP handlers for the OAuth2/OIDC implicit flow:
//! - `login_handler`: Stores a fresh state value and redirects to the provider
//! - `callback_handler`: Serves the page that forwards the redirect fragment
//! - `fragment_handler`: Validates the forwarded fragment and adopts the id_token
//! - `logout_handler`: Drops the local session
//! - `session_handler`: Current auth state and decoded claims as JSON

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use askama::Template;
use serde::Serialize;
use std::sync::Arc;

use super::jwt::Claims;
use super::session::{AuthState, FragmentOutcome, LoginError};
use crate::web::error::PortalError;
use crate::web::handlers::render_dashboard;
use crate::web::templates::CallbackTemplate;
use crate::AppState;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FragmentResponse {
    pub outcome: FragmentOutcome,
    /// Where the callback page navigates next (fragment-free)
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub auth_state: AuthState,
    pub claims: Option<Claims>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Login handler - starts the implicit flow
///
/// An incomplete configuration renders the dashboard with a notice instead of
/// navigating anywhere.
pub async fn login_handler(State(state): State<Arc<AppState>>) -> Result<Response, PortalError> {
    tracing::info!("Login requested");

    match state.session.login(&state.config.portal) {
        Ok(authorize_url) => Ok(Redirect::to(authorize_url.as_str()).into_response()),
        Err(LoginError::Store(e)) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Login refused");
            render_dashboard(&state, Some(e.to_string())).await
        }
    }
}

/// Callback page - the provider redirects here with the tokens in the fragment
pub async fn callback_handler() -> Result<Html<String>, PortalError> {
    tracing::info!("OAuth callback page requested");
    Ok(Html(CallbackTemplate.render()?))
}

/// Fragment handler - receives the raw fragment posted by the callback page
pub async fn fragment_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<FragmentResponse>, PortalError> {
    let outcome = state.session.capture_redirect(&body).await?;

    tracing::info!(outcome = ?outcome, "Redirect fragment processed");

    Ok(Json(FragmentResponse {
        outcome,
        redirect: "/",
    }))
}

/// Logout handler - forgets the token locally; the provider session is untouched
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<Redirect, PortalError> {
    state.session.logout().await?;
    Ok(Redirect::to("/"))
}

pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(SessionView {
        auth_state: state.session.auth_state().await,
        claims: state.session.claims().await,
    })
}
