//! Bearer-authenticated HTTP client for the preferences API

use std::error::Error as StdError;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE,
};
use reqwest::Method;

use super::results::ApiResult;
use crate::auth::helpers::create_http_client;

/// Method, body and extra headers for one call
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    /// Applied on top of the default headers, replacing any with the same name
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_json_body(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Default headers for every call, with the caller's headers layered on top
pub fn build_headers(token: &str, extra: &HeaderMap) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))?,
    );

    for name in extra.keys() {
        headers.remove(name);
    }
    for (name, value) in extra {
        headers.append(name.clone(), value.clone());
    }

    Ok(headers)
}

/// Render an error with its source chain, e.g.
/// `error sending request for url (…): client error (Connect): …`
fn error_chain(error: &dyn StdError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, connect_timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base_url: base_url.into(),
            client: create_http_client(connect_timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request against `base_url + path` and describe the outcome.
    ///
    /// Never fails: a missing response becomes a status-0 result.
    pub async fn call(&self, token: &str, path: &str, options: RequestOptions) -> ApiResult {
        let url = format!("{}{}", self.base_url, path);

        let headers = match build_headers(token, &options.headers) {
            Ok(headers) => headers,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not build request headers");
                return ApiResult::network_failure(e);
            }
        };

        tracing::debug!(method = %options.method, url = %url, "Calling preferences API");

        let mut request = self.client.request(options.method.clone(), &url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = error_chain(&e);
                tracing::warn!(
                    method = %options.method,
                    url = %url,
                    error = %error,
                    "Preferences API unreachable"
                );
                return ApiResult::network_failure(error);
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) => {
                tracing::info!(
                    method = %options.method,
                    url = %url,
                    status = status,
                    body_len = text.len(),
                    "Preferences API responded"
                );
                ApiResult::from_response(status, text)
            }
            Err(e) => {
                let error = error_chain(&e);
                tracing::warn!(
                    url = %url,
                    status = status,
                    error = %error,
                    "Failed to read preferences API response body"
                );
                ApiResult::network_failure(error)
            }
        }
    }
}
