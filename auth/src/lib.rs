//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the SSO service:
//! - Password hashing (Argon2id) with a configurable work factor
//! - Session token issuance (HS256 JWT signed with a per-app secret)
//!
//! The service owns the business rules (who may log in, which errors the caller
//! sees); this crate only knows how to hash, verify, sign and decode.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashingCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::with_cost(HashingCost::new(1024, 1, 1)).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::time::Duration;
//!
//! use auth::{JwtHandler, SessionClaims, SigningApp, TokenIssuer, TokenSubject};
//!
//! let issuer = TokenIssuer::new(Duration::from_secs(3600));
//! let subject = TokenSubject { user_id: 1, email: "a@x.com" };
//! let app = SigningApp { app_id: 1, secret: b"app-secret" };
//!
//! let issued = issuer.issue(&subject, &app).unwrap();
//!
//! let claims: SessionClaims = JwtHandler::new(b"app-secret")
//!     .unwrap()
//!     .decode(&issued.token)
//!     .unwrap();
//! assert_eq!(claims.uid, 1);
//! assert_eq!(claims.app_id, 1);
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::IssuedToken;
pub use issuer::SigningApp;
pub use issuer::TokenIssuer;
pub use issuer::TokenSubject;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
