use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token payload.
///
/// Binds a user to one app until `exp`. Field names are part of the wire
/// format that token consumers rely on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// User identifier
    pub uid: i64,

    /// User email at issuance time
    pub email: String,

    /// App the token was issued for
    pub app_id: i32,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims expiring at the given instant.
    ///
    /// # Arguments
    /// * `uid` - User identifier
    /// * `email` - User email
    /// * `app_id` - Target app identifier
    /// * `expires_at` - Absolute expiration instant
    pub fn new(uid: i64, email: impl Into<String>, app_id: i32, expires_at: DateTime<Utc>) -> Self {
        Self {
            uid,
            email: email.into(),
            app_id,
            exp: expires_at.timestamp(),
        }
    }
}
