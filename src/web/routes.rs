use super::handlers::{
    children_handler, dashboard_handler, defaults_handler, delete_handler, healthz_handler,
    me_handler, put_handler, readyz_handler, results_handler,
};
use crate::{
    auth::{callback_handler, fragment_handler, login_handler, logout_handler, session_handler},
    config::{callback_path_conflict, STATIC_PREFIX},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(dashboard_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        // GET allows starting a login from a plain link
        .route("/auth/login", get(login_handler).post(login_handler))
        .route("/auth/fragment", post(fragment_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/session", get(session_handler))
        .route("/api/me", post(me_handler))
        .route("/api/defaults", post(defaults_handler))
        .route("/api/put", post(put_handler))
        .route("/api/delete", post(delete_handler))
        .route("/api/children", post(children_handler))
        .route("/api/results", get(results_handler))
        .nest_service(STATIC_PREFIX, ServeDir::new("static"));

    // Mounted wherever the configured redirect URI points. At the root the
    // dashboard forwards the fragment instead.
    let callback_path = state.config.portal.callback_path();
    if callback_path != "/" {
        match callback_path_conflict(&callback_path) {
            None => router = router.route(&callback_path, get(callback_handler)),
            Some(conflict) => tracing::error!(
                callback_path = %callback_path,
                conflict = %conflict,
                "Callback page not mounted"
            ),
        }
    }

    router.with_state(state)
}
