//! Identity token decoding for display
//!
//! Nothing here verifies a signature. The portal only shows what the token
//! claims; the preferences API is the party that validates it.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// Standard alphabet, padding optional, trailing bits tolerated
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Placeholder shown when the token carries no usable identity claim
pub const ANONYMOUS_DISPLAY_NAME: &str = "user";

/// Decoded JWT payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(Value);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Non-empty string claim
    fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.text("email")
    }

    pub fn username(&self) -> Option<&str> {
        self.text("username")
            .or_else(|| self.text("cognito:username"))
    }

    /// Name for the auth bar: email, then username, then a generic placeholder
    pub fn display_name(&self) -> &str {
        self.email()
            .or_else(|| self.username())
            .unwrap_or(ANONYMOUS_DISPLAY_NAME)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.get("exp").and_then(Value::as_i64)
    }

    /// True only when an `exp` claim exists and lies in the past
    /// (with 5 second buffer for clock skew)
    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        self.expires_at().is_some_and(|exp| exp < now - 5)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }
}

/// Decode the payload segment of a JWT-shaped string.
///
/// Returns `None` when there is no second segment, the segment is not
/// base64url, the bytes are not UTF-8, or the text is not JSON.
pub fn decode_jwt(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let normalized = payload.replace('-', "+").replace('_', "/");
    let bytes = LENIENT_STANDARD.decode(normalized).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let value = serde_json::from_str::<Value>(&text).ok()?;
    Some(Claims(value))
}

/// Display name for an optional set of claims
pub fn display_name(claims: Option<&Claims>) -> &str {
    claims.map_or(ANONYMOUS_DISPLAY_NAME, Claims::display_name)
}
