use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as HashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Argon2id work factor.
///
/// Existing hashes keep verifying after a change: each PHC string records the
/// parameters it was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl HashingCost {
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))
    }
}

impl Default for HashingCost {
    fn default() -> Self {
        Self::new(
            Params::DEFAULT_M_COST,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
        )
    }
}

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
/// Cloning is cheap, so a copy can be moved onto a blocking thread.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with the Argon2 default cost
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `cost` - Argon2id memory, iteration and parallelism settings
    ///
    /// # Errors
    /// * `InvalidCost` - Parameters are outside the ranges Argon2 accepts
    pub fn with_cost(cost: HashingCost) -> Result<Self, PasswordError> {
        Ok(Self {
            params: cost.params()?,
        })
    }

    /// Work factor new hashes are produced with.
    pub fn cost(&self) -> HashingCost {
        HashingCost::new(
            self.params.m_cost(),
            self.params.t_cost(),
            self.params.p_cost(),
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password securely.
    ///
    /// A fresh random salt is generated on every call, so hashing the same
    /// password twice never yields the same string.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The salt and parameters embedded in `hash` are used for recomputation and
    /// the outputs are compared in constant time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid or verification failed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
