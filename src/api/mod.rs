//! Preferences API calls made with the session's identity token
//!
//! Each call runs to completion on its own task and produces an
//! [`ApiResult`]; the result is then joined into the shared [`ApiResults`]
//! map under the operation key. The map is locked only for that final write.

pub mod client;
pub mod operations;
pub mod results;

pub use client::{ApiClient, RequestOptions};
pub use operations::{ApiOperation, OperationInfo, OPERATIONS};
pub use results::{ApiResult, ApiResults};

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::Session;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiCallError {
    #[error("Please login first.")]
    NotAuthenticated,
    #[error("Preference key is required.")]
    MissingPreferenceKey,
    #[error("API call task failed: {0}")]
    TaskFailed(String),
}

/// Call `path` with the session's token and record the outcome under `key`.
///
/// Without a token nothing is sent and nothing is recorded. HTTP errors and
/// network failures are recorded as results, never returned as errors.
/// Dropping the returned future does not cancel the call.
pub async fn call_api(
    session: &Session,
    client: &ApiClient,
    results: &Arc<RwLock<ApiResults>>,
    key: &str,
    path: &str,
    options: RequestOptions,
) -> Result<(), ApiCallError> {
    let Some(token) = session.id_token().await else {
        tracing::warn!(key = key, path = path, "API call refused: not logged in");
        return Err(ApiCallError::NotAuthenticated);
    };

    let client = client.clone();
    let results = Arc::clone(results);
    let key = key.to_string();
    let path = path.to_string();

    let task = tokio::spawn(async move {
        let result = client.call(&token, &path, options).await;

        tracing::info!(
            key = %key,
            status = result.status,
            ok = result.ok,
            "API call finished"
        );
        results.write().await.record(&key, result);
    });

    task.await.map_err(|e| {
        tracing::error!(error = %e, "API call task did not complete");
        ApiCallError::TaskFailed(e.to_string())
    })
}

/// Validate and run one of the portal's predefined operations
pub async fn run_operation(
    session: &Session,
    client: &ApiClient,
    results: &Arc<RwLock<ApiResults>>,
    operation: &ApiOperation,
) -> Result<(), ApiCallError> {
    operation.validate()?;
    call_api(
        session,
        client,
        results,
        operation.key(),
        &operation.path(),
        operation.request_options(),
    )
    .await
}
