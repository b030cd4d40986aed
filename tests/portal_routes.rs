//! Router-level tests for the portal's browser-facing endpoints

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use dev_portal::auth::{KeyValueStore, MemoryStore, STATE_KEY, TOKEN_KEY};
use dev_portal::config::{Config, RESERVED_PATHS};
use dev_portal::{web, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "a.eyJlbWFpbCI6ImFAYi5jb20ifQ.sig";

fn config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

fn complete_config(api_base_url: &str) -> Config {
    config(&[
        ("COGNITO_DOMAIN", "https://auth.example.com/"),
        ("COGNITO_CLIENT_ID", "client-123"),
        ("COGNITO_REGION", "eu-west-1"),
        ("API_BASE_URL", api_base_url),
    ])
}

fn portal(config: Config) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone()).unwrap());
    (web::create_router(state), store)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let (router, _) = portal(config(&[]));
    let (status, _, _) = send(&router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_readyz_reports_missing_config() {
    let (router, _) = portal(config(&[("COGNITO_DOMAIN", "https://auth.example.com")]));
    let (status, _, body) = send(&router, get("/readyz")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("COGNITO_CLIENT_ID"));
    assert!(!body.contains("COGNITO_DOMAIN"));

    let (router, _) = portal(complete_config("https://api.example.com"));
    let (status, _, body) = send(&router, get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

#[tokio::test]
async fn test_dashboard_logged_out() {
    let (router, _) = portal(config(&[]));
    let (status, _, body) = send(&router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Configuration incomplete"));
    assert!(body.contains(">Login</button>"));
    assert!(body.contains("No call yet."));
    assert!(!body.contains("Logged in as"));
}

#[tokio::test]
async fn test_login_refused_with_incomplete_config() {
    let (router, store) = portal(config(&[("COGNITO_CLIENT_ID", "client-123")]));
    let (status, headers, body) = send(&router, post("/auth/login", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::LOCATION).is_none());
    assert!(body.contains("Missing required config"));
    assert_eq!(store.get(STATE_KEY), None);
}

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let (router, store) = portal(complete_config("https://api.example.com"));
    let (status, headers, _) = send(&router, post("/auth/login", "")).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://auth.example.com/oauth2/authorize?client_id=client-123"));
    assert!(location.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A5173%2Fcallback"));

    let state_value = store.get(STATE_KEY).unwrap();
    assert!(location.ends_with(&format!("state={}", state_value)));
}

/// The fragment leaves the address bar before it is posted anywhere
fn assert_clears_fragment_before_posting(body: &str) {
    let replace_state = body.find("history.replaceState").unwrap();
    let fetch = body.find("fetch(\"/auth/fragment\"").unwrap();
    assert!(replace_state < fetch);
}

#[tokio::test]
async fn test_callback_page_forwards_fragment() {
    let (router, _) = portal(config(&[]));
    let (status, _, body) = send(&router, get("/callback")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("forwardFragment(fragment);"));
    assert_clears_fragment_before_posting(&body);
}

#[tokio::test]
async fn test_dashboard_forwards_fragment_for_root_redirect_uri() {
    let (router, store) = portal(config(&[
        ("COGNITO_DOMAIN", "https://auth.example.com"),
        ("COGNITO_CLIENT_ID", "client-123"),
        ("COGNITO_REGION", "eu-west-1"),
        ("API_BASE_URL", "https://api.example.com"),
        ("COGNITO_REDIRECT_URI", "http://localhost:5173/"),
    ]));

    let (status, _, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("isSignInResponse(fragment)"));
    assert_clears_fragment_before_posting(&body);

    let (status, _, _) = send(&router, get("/callback")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // What the dashboard script posts once the provider lands on "/"
    store.set(STATE_KEY, "X").unwrap();
    let (_, _, body) = send(
        &router,
        post("/auth/fragment", &format!("state=X&id_token={}", TOKEN)),
    )
    .await;
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["outcome"], "token_captured");
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_dashboard_does_not_forward_with_dedicated_callback() {
    let (router, _) = portal(complete_config("https://api.example.com"));
    let (_, _, body) = send(&router, get("/")).await;
    assert!(!body.contains("/auth/fragment"));
}

#[tokio::test]
async fn test_every_reserved_path_is_routed() {
    let (router, _) = portal(complete_config("https://api.example.com"));
    for path in RESERVED_PATHS {
        let (status, _, _) = send(&router, get(path)).await;
        assert_ne!(status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
async fn test_conflicting_callback_path_is_not_mounted() {
    // Built directly, past the checks in Config::from_lookup
    let mut config = complete_config("https://api.example.com");
    config.portal.redirect_uri = "http://localhost:5173/healthz".to_string();
    let (router, _) = portal(config);

    let (status, _, body) = send(&router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("/auth/fragment"));
}

#[tokio::test]
async fn test_callback_page_follows_redirect_uri_path() {
    let (router, _) = portal(config(&[(
        "COGNITO_REDIRECT_URI",
        "http://localhost:5173/signed-in",
    )]));

    let (status, _, _) = send(&router, get("/signed-in")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&router, get("/callback")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fragment_with_matching_state_logs_in() {
    let (router, store) = portal(complete_config("https://api.example.com"));
    store.set(STATE_KEY, "X").unwrap();

    let (status, _, body) = send(
        &router,
        post("/auth/fragment", &format!("#state=X&id_token={}", TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response, json!({"outcome": "token_captured", "redirect": "/"}));

    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some(TOKEN));
    assert_eq!(store.get(STATE_KEY), None);

    let (_, _, body) = send(&router, get("/")).await;
    assert!(body.contains("Logged in as"));
    assert!(body.contains("<strong>a@b.com</strong>"));
    assert!(body.contains(">Logout</button>"));
}

#[tokio::test]
async fn test_fragment_with_mismatched_state_is_ignored() {
    let (router, store) = portal(complete_config("https://api.example.com"));
    store.set(STATE_KEY, "X").unwrap();

    let (_, _, body) = send(&router, post("/auth/fragment", "state=Y&id_token=T")).await;
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["outcome"], "state_mismatch");

    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(store.get(STATE_KEY).as_deref(), Some("X"));
}

#[tokio::test]
async fn test_session_endpoint() {
    let (router, _) = portal(complete_config("https://api.example.com"));

    let (_, _, body) = send(&router, get("/auth/session")).await;
    let session: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(session, json!({"authState": "logged_out", "claims": null}));

    send(&router, post("/auth/fragment", &format!("id_token={}", TOKEN))).await;

    let (_, _, body) = send(&router, get("/auth/session")).await;
    let session: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(session["authState"], "logged_in");
    assert_eq!(session["claims"]["email"], "a@b.com");
}

#[tokio::test]
async fn test_undecodable_token_shows_placeholder() {
    let (router, _) = portal(complete_config("https://api.example.com"));
    send(&router, post("/auth/fragment", "id_token=opaque")).await;

    let (_, _, body) = send(&router, get("/")).await;
    assert!(body.contains("<strong>user</strong>"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (router, store) = portal(complete_config("https://api.example.com"));
    send(&router, post("/auth/fragment", &format!("id_token={}", TOKEN))).await;

    let (status, headers, _) = send(&router, post("/auth/logout", "")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
    assert_eq!(store.get(TOKEN_KEY), None);

    let (_, _, body) = send(&router, get("/")).await;
    assert!(!body.contains("Logged in as"));
}

#[tokio::test]
async fn test_api_call_without_token_shows_notice() {
    let (router, _) = portal(complete_config("https://api.example.com"));

    let (status, _, body) = send(&router, post("/api/me", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please login first."));

    let (_, _, body) = send(&router, get("/api/results")).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({}));
}

#[tokio::test]
async fn test_put_without_key_shows_notice() {
    let (router, _) = portal(complete_config("https://api.example.com"));
    send(&router, post("/auth/fragment", &format!("id_token={}", TOKEN))).await;

    let (_, _, body) = send(&router, post_form("/api/put", "preferenceKey=&value=dark")).await;
    assert!(body.contains("Preference key is required."));
}

#[tokio::test]
async fn test_put_round_trip_through_portal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uiTheme": "dark"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (router, _) = portal(complete_config(&mock_server.uri()));
    send(&router, post("/auth/fragment", &format!("id_token={}", TOKEN))).await;

    let (status, headers, _) = send(
        &router,
        post_form("/api/put", "preferenceKey=uiTheme&value=dark"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/#put");

    let (_, _, body) = send(&router, get("/api/results")).await;
    let results: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(results["put"]["status"], 200);
    assert_eq!(results["put"]["ok"], true);
    assert_eq!(results["put"]["data"], json!({"uiTheme": "dark"}));

    let (_, _, body) = send(&router, get("/")).await;
    assert!(body.contains("<strong>Status:</strong> 200"));
}
