use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DirectoryAdmin;
use crate::domain::identity::models::App;
use crate::domain::identity::models::AppId;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::AppRepository;
use crate::domain::identity::ports::UserRepository;
use crate::identity::errors::StorageError;

struct UserRecord {
    user: User,
    is_admin: bool,
}

#[derive(Default)]
struct Directory {
    users: HashMap<UserId, UserRecord>,
    ids_by_email: HashMap<String, UserId>,
    apps: HashMap<AppId, App>,
    last_user_id: i64,
}

/// Process-local credential store.
///
/// Used when no database is configured and by tests. Registration checks and
/// inserts under a single write lock, which gives the same atomicity as a
/// unique constraint.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    directory: RwLock<Directory>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryCredentialStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserId, StorageError> {
        let mut directory = self.directory.write().await;

        if directory.ids_by_email.contains_key(email) {
            return Err(StorageError::UserAlreadyExists(email.to_string()));
        }

        directory.last_user_id += 1;
        let id = UserId(directory.last_user_id);

        directory.ids_by_email.insert(email.to_string(), id);
        directory.users.insert(
            id,
            UserRecord {
                user: User {
                    id,
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                },
                is_admin: false,
            },
        );

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StorageError> {
        let directory = self.directory.read().await;

        directory
            .ids_by_email
            .get(email)
            .and_then(|id| directory.users.get(id))
            .map(|record| record.user.clone())
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.directory
            .read()
            .await
            .users
            .get(&user_id)
            .map(|record| record.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppRepository for InMemoryCredentialStore {
    async fn find_by_id(&self, app_id: AppId) -> Result<App, StorageError> {
        self.directory
            .read()
            .await
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound(app_id))
    }
}

#[async_trait]
impl DirectoryAdmin for InMemoryCredentialStore {
    async fn provision_app(&self, app: &App) -> Result<(), StorageError> {
        self.directory
            .write()
            .await
            .apps
            .insert(app.id, app.clone());
        Ok(())
    }

    async fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        let mut directory = self.directory.write().await;
        let record = directory
            .users
            .get_mut(&user_id)
            .ok_or(StorageError::UserNotFound)?;
        record.is_admin = is_admin;
        Ok(())
    }
}
