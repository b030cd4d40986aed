use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::StoreError;

/// Failures a portal handler cannot turn into a page
#[derive(Debug)]
pub enum PortalError {
    Store(StoreError),
    Template(askama::Error),
}

impl From<StoreError> for PortalError {
    fn from(e: StoreError) -> Self {
        PortalError::Store(e)
    }
}

impl From<askama::Error> for PortalError {
    fn from(e: askama::Error) -> Self {
        PortalError::Template(e)
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match self {
            PortalError::Store(e) => {
                tracing::error!(error = %e, "Session store write failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Session store error",
                        "message": e.to_string(),
                        "code": "STORE_ERROR"
                    })),
                )
                    .into_response()
            }

            PortalError::Template(e) => {
                tracing::error!(error = %e, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "message": "Template error"
                    })),
                )
                    .into_response()
            }
        }
    }
}
