use async_trait::async_trait;

use crate::domain::identity::models::App;
use crate::domain::identity::models::AppId;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::identity::errors::AuthError;
use crate::identity::errors::StorageError;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue a session token for an app.
    ///
    /// # Arguments
    /// * `email` - Account email
    /// * `password` - Plaintext password
    /// * `app_id` - App the token is requested for
    ///
    /// # Returns
    /// Signed session token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `InvalidAppId` - App id can never name a provisioned app
    /// * `Internal` - App lookup, store or signing failure
    async fn login(&self, email: &str, password: &str, app_id: AppId)
        -> Result<String, AuthError>;

    /// Register a new user.
    ///
    /// # Arguments
    /// * `email` - Unique account email
    /// * `password` - Plaintext password (hashed before storage)
    ///
    /// # Returns
    /// Identifier assigned by the store
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email is already registered
    /// * `MissingField` - Email or password is empty
    /// * `Internal` - Hashing or store failure
    async fn register_new_user(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// Check whether a user holds the admin privilege.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    /// * `Internal` - Store failure
    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError>;
}

/// Persistence operations for users.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a user keyed by email.
    ///
    /// The uniqueness check and the insert must be one atomic step.
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email is already registered
    /// * `Database` - Storage operation failed
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserId, StorageError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this email
    /// * `Database` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<User, StorageError>;

    /// Read the admin flag of a user.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    /// * `Database` - Storage operation failed
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError>;
}

/// Read access to the app registry.
#[async_trait]
pub trait AppRepository: Send + Sync + 'static {
    /// Retrieve app by identifier.
    ///
    /// # Errors
    /// * `AppNotFound` - No app with this id
    /// * `Database` - Storage operation failed
    async fn find_by_id(&self, app_id: AppId) -> Result<App, StorageError>;
}
