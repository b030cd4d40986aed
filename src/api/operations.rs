use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde_json::json;

use super::client::RequestOptions;
use super::ApiCallError;

/// Characters escaped in a single path segment. Leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
/// untouched, the same set a browser's `encodeURIComponent` keeps.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The preference API calls the portal can make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOperation {
    /// Resolved preferences for the token's subject
    Me,
    /// Managed defaults
    Defaults,
    /// Upsert one preference
    Put {
        preference_key: String,
        value: String,
    },
    /// Remove a stored override
    Delete { preference_key: String },
    /// Children linked to the token's subject (adult accounts only)
    Children,
}

impl ApiOperation {
    /// Key the result is recorded under
    pub fn key(&self) -> &'static str {
        match self {
            ApiOperation::Me => "me",
            ApiOperation::Defaults => "defaults",
            ApiOperation::Put { .. } => "put",
            ApiOperation::Delete { .. } => "delete",
            ApiOperation::Children => "children",
        }
    }

    pub fn path(&self) -> String {
        match self {
            ApiOperation::Me | ApiOperation::Put { .. } => "/me/preferences".to_string(),
            ApiOperation::Defaults => "/default-preferences".to_string(),
            ApiOperation::Delete { preference_key } => {
                format!(
                    "/me/preferences/{}",
                    utf8_percent_encode(preference_key, PATH_SEGMENT)
                )
            }
            ApiOperation::Children => "/children".to_string(),
        }
    }

    pub fn request_options(&self) -> RequestOptions {
        match self {
            ApiOperation::Me | ApiOperation::Defaults | ApiOperation::Children => {
                RequestOptions::new(Method::GET)
            }
            ApiOperation::Put {
                preference_key,
                value,
            } => RequestOptions::new(Method::PUT).with_json_body(&json!({
                "preferenceKey": preference_key,
                "value": value,
            })),
            ApiOperation::Delete { .. } => RequestOptions::new(Method::DELETE),
        }
    }

    /// Form-level guard: put and delete need a preference key
    pub fn validate(&self) -> Result<(), ApiCallError> {
        match self {
            ApiOperation::Put { preference_key, .. } | ApiOperation::Delete { preference_key }
                if preference_key.is_empty() =>
            {
                Err(ApiCallError::MissingPreferenceKey)
            }
            _ => Ok(()),
        }
    }
}

/// Static description of an operation for the dashboard
#[derive(Debug, Clone, Copy)]
pub struct OperationInfo {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const OPERATIONS: &[OperationInfo] = &[
    OperationInfo {
        key: "me",
        title: "GET /me/preferences",
        description: "Returns resolved preferences for the current user.",
    },
    OperationInfo {
        key: "defaults",
        title: "GET /default-preferences",
        description: "Shows managed defaults via the shared resolver.",
    },
    OperationInfo {
        key: "put",
        title: "PUT /me/preferences",
        description: "Upsert a preference key/value.",
    },
    OperationInfo {
        key: "delete",
        title: "DELETE /me/preferences/{preferenceKey}",
        description: "Remove a stored override for the current user.",
    },
    OperationInfo {
        key: "children",
        title: "GET /children",
        description: "Lists children linked to the current adult account.",
    },
];
