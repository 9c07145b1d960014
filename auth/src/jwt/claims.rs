use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// The subject is the authenticated user's email address; `exp` and `iat`
/// are Unix timestamps set at issue time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user email)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessClaims {
    /// Create claims for a subject with a fixed lifetime in minutes.
    pub fn for_subject(email: impl Into<String>, lifetime_minutes: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::minutes(lifetime_minutes);

        Self {
            sub: email.into(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Check whether the token is expired at the given timestamp.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
