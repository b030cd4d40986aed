use super::error::PortalError;
use super::templates::{DashboardTemplate, SectionView};
use crate::{
    api::{ApiOperation, OPERATIONS},
    auth::jwt::display_name,
    AppState,
};
use askama::Template;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PutPreferenceForm {
    #[serde(rename = "preferenceKey", default)]
    pub preference_key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePreferenceForm {
    #[serde(rename = "preferenceKey", default)]
    pub preference_key: String,
}

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe - ready once every required setting is present
///
/// Returns 503 Service Unavailable listing the missing settings otherwise.
pub async fn readyz_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let missing = state.config.portal.missing_fields();

    if missing.is_empty() {
        (StatusCode::OK, "ready".to_string())
    } else {
        tracing::warn!(missing = ?missing, "Readiness check failed: configuration incomplete");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("not ready: missing {}", missing.join(", ")),
        )
    }
}

/// Render the dashboard, optionally with a blocking notice from a refused action
pub async fn render_dashboard(
    state: &AppState,
    notice: Option<String>,
) -> Result<Response, PortalError> {
    let claims = state.session.claims().await;
    let logged_in = state.session.id_token().await.is_some();

    let sections = {
        let results = state.results.read().await;
        OPERATIONS
            .iter()
            .map(|info| SectionView::new(info, results.get(info.key)))
            .collect()
    };

    let template = DashboardTemplate {
        config_ok: state.config.portal.is_complete(),
        missing_config: state.config.portal.missing_fields().join(", "),
        logged_in,
        display_name: display_name(claims.as_ref()).to_string(),
        token_expired: claims.as_ref().is_some_and(|c| c.is_expired()),
        claims_json: claims.as_ref().map(|c| c.to_pretty_json()).unwrap_or_default(),
        notice: notice.unwrap_or_default(),
        sections,
        forward_fragment: state.config.portal.callback_is_root(),
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Result<Response, PortalError> {
    render_dashboard(&state, None).await
}

/// Run an operation, then either go back to the dashboard or show why it was refused
async fn operation_response(
    state: &AppState,
    operation: ApiOperation,
) -> Result<Response, PortalError> {
    match state.run_operation(&operation).await {
        Ok(()) => Ok(Redirect::to(&format!("/#{}", operation.key())).into_response()),
        Err(e) => render_dashboard(state, Some(e.to_string())).await,
    }
}

pub async fn me_handler(State(state): State<Arc<AppState>>) -> Result<Response, PortalError> {
    operation_response(&state, ApiOperation::Me).await
}

pub async fn defaults_handler(State(state): State<Arc<AppState>>) -> Result<Response, PortalError> {
    operation_response(&state, ApiOperation::Defaults).await
}

pub async fn children_handler(State(state): State<Arc<AppState>>) -> Result<Response, PortalError> {
    operation_response(&state, ApiOperation::Children).await
}

pub async fn put_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PutPreferenceForm>,
) -> Result<Response, PortalError> {
    operation_response(
        &state,
        ApiOperation::Put {
            preference_key: form.preference_key,
            value: form.value,
        },
    )
    .await
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeletePreferenceForm>,
) -> Result<Response, PortalError> {
    operation_response(
        &state,
        ApiOperation::Delete {
            preference_key: form.preference_key,
        },
    )
    .await
}

/// Latest result per operation key as JSON
pub async fn results_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.results.read().await.clone())
}
