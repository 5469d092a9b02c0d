use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;

/// Identity the token is issued to.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: i64,
    pub email: &'a str,
}

/// App whose trust domain the token belongs to.
#[derive(Clone, Copy)]
pub struct SigningApp<'a> {
    pub app_id: i32,
    pub secret: &'a [u8],
}

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Signed JWT
    pub token: String,
    /// Instant after which the token must be rejected
    pub expires_at: DateTime<Utc>,
}

/// Session token issuer.
///
/// Token lifetimes are injected at construction: one default plus optional
/// per-app overrides. Signing secrets are supplied per call because they belong
/// to the app registry, not to the issuer.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    default_ttl: Duration,
    app_ttls: HashMap<i32, Duration>,
}

impl TokenIssuer {
    /// Create an issuer whose tokens live for `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            app_ttls: HashMap::new(),
        }
    }

    /// Override the token lifetime for one app.
    pub fn with_app_ttl(mut self, app_id: i32, ttl: Duration) -> Self {
        self.app_ttls.insert(app_id, ttl);
        self
    }

    /// Lifetime applied to tokens for `app_id`.
    pub fn ttl_for(&self, app_id: i32) -> Duration {
        self.app_ttls
            .get(&app_id)
            .copied()
            .unwrap_or(self.default_ttl)
    }

    /// Issue a token expiring `ttl_for(app)` from now.
    ///
    /// # Errors
    /// * `EmptySecret` - The app has no usable signing secret
    /// * `EncodingFailed` - The lifetime overflows or signing failed
    pub fn issue(
        &self,
        subject: &TokenSubject<'_>,
        app: &SigningApp<'_>,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, app, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &TokenSubject<'_>,
        app: &SigningApp<'_>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let ttl = chrono::Duration::from_std(self.ttl_for(app.app_id))
            .map_err(|e| JwtError::EncodingFailed(format!("Invalid token lifetime: {}", e)))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::EncodingFailed("Token expiration overflows".to_string()))?;

        let claims = SessionClaims::new(subject.user_id, subject.email, app.app_id, expires_at);
        let token = JwtHandler::new(app.secret)?.encode(&claims)?;

        Ok(IssuedToken { token, expires_at })
    }
}
