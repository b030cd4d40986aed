use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Outcome of one call to the preferences API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult {
    /// HTTP status, or 0 when no response arrived
    pub status: u16,
    pub ok: bool,
    /// Parsed JSON body, the raw text as a JSON string when it is not JSON,
    /// or nothing for an empty body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub raw: String,
}

impl ApiResult {
    pub fn from_response(status: u16, raw: String) -> Self {
        let data = if raw.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&raw).unwrap_or_else(|_| Value::String(raw.clone())))
        };

        Self {
            status,
            ok: (200..=299).contains(&status),
            data,
            raw,
        }
    }

    pub fn network_failure(error: impl fmt::Display) -> Self {
        Self {
            status: 0,
            ok: false,
            data: None,
            raw: error.to_string(),
        }
    }

    /// Pretty-printed body for display: the data when present, else the raw text
    pub fn display_body(&self) -> String {
        let shown = self
            .data
            .clone()
            .unwrap_or_else(|| Value::String(self.raw.clone()));
        serde_json::to_string_pretty(&shown).unwrap_or_else(|_| self.raw.clone())
    }
}

/// Latest result per operation key
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ApiResults(BTreeMap<String, ApiResult>);

impl ApiResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a finished call into the map. The last result recorded for a key
    /// replaces whatever was there, regardless of when its request started.
    pub fn record(&mut self, key: &str, result: ApiResult) {
        self.0.insert(key.to_string(), result);
    }

    pub fn get(&self, key: &str) -> Option<&ApiResult> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
