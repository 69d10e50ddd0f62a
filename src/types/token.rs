//! Token Types
//!
//! X-App token definitions.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Response body of the credential exchange endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct XAppTokenResponse {
    /// Token value.
    pub token: String,
    /// Instant the token stops being accepted.
    #[serde(rename = "expires_in", alias = "expiration", alias = "expires_at")]
    pub expires_at: DateTime<Utc>,
    /// Response type marker (`xapp_token`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Application access token.
///
/// Validity is computed on every call, so a token ages out without any
/// explicit state change.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create new access token.
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: SecretString::new(value.into()),
            expires_at,
        }
    }

    /// A token that is never valid.
    pub fn empty() -> Self {
        Self::new(String::new(), DateTime::<Utc>::MIN_UTC)
    }

    /// Get token value (for the `X-Xapp-Token` header).
    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True iff the token is non-empty and has not expired.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Validity at a given instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.secret().is_empty() && now < self.expires_at
    }

    /// Get time until expiration.
    pub fn expires_in(&self) -> Option<std::time::Duration> {
        let now = Utc::now();
        if self.expires_at > now {
            (self.expires_at - now).to_std().ok()
        } else {
            None
        }
    }
}

impl From<XAppTokenResponse> for AccessToken {
    fn from(response: XAppTokenResponse) -> Self {
        Self::new(response.token, response.expires_at)
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.secret() == other.secret() && self.expires_at == other.expires_at
    }
}

impl Eq for AccessToken {}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_token_is_invalid_regardless_of_expiry() {
        let token = AccessToken::new("", Utc::now() + Duration::days(7));
        assert!(!token.is_valid());
        assert!(!AccessToken::empty().is_valid());
    }

    #[test]
    fn test_validity_is_strict_on_expiry() {
        let expiry = Utc::now() + Duration::hours(1);
        let token = AccessToken::new("abc", expiry);

        assert!(token.is_valid_at(expiry - Duration::seconds(1)));
        assert!(!token.is_valid_at(expiry));
        assert!(!token.is_valid_at(expiry + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_token_ages_out_without_mutation() {
        let token = AccessToken::new("abc", Utc::now() + Duration::milliseconds(50));
        assert!(token.is_valid());

        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        assert!(!token.is_valid());
        assert!(token.expires_in().is_none());
    }

    #[test]
    fn test_parse_xapp_response() {
        let body = r#"{"type":"xapp_token","token":"abc123","expires_in":"2030-01-01T00:00:00.000Z"}"#;
        let response: XAppTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.kind.as_deref(), Some("xapp_token"));

        let token = AccessToken::from(response);
        assert_eq!(token.secret(), "abc123");
        assert_eq!(token.expires_at().to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_xapp_response_expiration_alias() {
        let body = r#"{"token":"abc123","expiration":"2030-01-01T00:00:00Z"}"#;
        let response: XAppTokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.token, "abc123");
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::new("very-secret", Utc::now());
        assert!(!format!("{:?}", token).contains("very-secret"));
    }
}
