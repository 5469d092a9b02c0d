use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow services to define their own token payload.
/// Uses HS256 (HMAC with SHA-256) algorithm by default.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Errors
    /// * `EmptySecret` - An empty key would make every signature forgeable
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// The `exp` claim is mandatory and checked without leeway.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its `exp` claim
    /// * `InvalidToken` - Token signature does not match this handler's secret
    /// * `DecodingFailed` - Token is malformed or misses required claims
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::DecodingFailed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}
