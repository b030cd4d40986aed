use askama::Template;

use crate::api::{ApiResult, OperationInfo};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub config_ok: bool,
    /// Comma-separated names of the empty required settings
    pub missing_config: String,
    pub logged_in: bool,
    pub display_name: String,
    pub token_expired: bool,
    /// Pretty-printed claims, empty when the token could not be decoded
    pub claims_json: String,
    /// Blocking message from the last refused action, empty when none
    pub notice: String,
    pub sections: Vec<SectionView>,
    /// Redirect URI is the site root, so this page receives sign-in fragments
    pub forward_fragment: bool,
}

#[derive(Template)]
#[template(path = "callback.html")]
pub struct CallbackTemplate;

/// One operation panel on the dashboard
#[derive(Debug, Clone)]
pub struct SectionView {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Panel has a preference key input
    pub needs_key: bool,
    /// Panel has a value input
    pub needs_value: bool,
    pub has_result: bool,
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

impl SectionView {
    pub fn new(info: &OperationInfo, result: Option<&ApiResult>) -> Self {
        Self {
            key: info.key,
            title: info.title,
            description: info.description,
            needs_key: matches!(info.key, "put" | "delete"),
            needs_value: info.key == "put",
            has_result: result.is_some(),
            status: result.map_or(0, |r| r.status),
            ok: result.is_some_and(|r| r.ok),
            body: result.map(ApiResult::display_body).unwrap_or_default(),
        }
    }
}
