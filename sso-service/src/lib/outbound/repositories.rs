use async_trait::async_trait;

use crate::domain::identity::models::App;
use crate::domain::identity::models::UserId;
use crate::identity::errors::StorageError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;

/// Out-of-band administration of the credential store.
///
/// Used by process bootstrap and operators; the authentication service never
/// writes apps or admin flags.
#[async_trait]
pub trait DirectoryAdmin: Send + Sync + 'static {
    /// Insert or replace an app registration.
    async fn provision_app(&self, app: &App) -> Result<(), StorageError>;

    /// Grant or revoke the admin privilege.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    async fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError>;
}
