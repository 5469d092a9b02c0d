use async_trait::async_trait;
use sqlx::PgPool;

use super::DirectoryAdmin;
use crate::domain::identity::models::App;
use crate::domain::identity::models::AppId;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::AppRepository;
use crate::domain::identity::ports::UserRepository;
use crate::identity::errors::StorageError;

const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresCredentialStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserId, StorageError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map(UserId)
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT)
                {
                    return StorageError::UserAlreadyExists(email.to_string());
                }
            }
            database_error(e)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StorageError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some((id, email, password_hash)) => Ok(User {
                id: UserId(id),
                email,
                password_hash,
            }),
            None => Err(StorageError::UserNotFound),
        }
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppRepository for PostgresCredentialStore {
    async fn find_by_id(&self, app_id: AppId) -> Result<App, StorageError> {
        let row = sqlx::query_as::<_, (i32, String, Vec<u8>)>(
            r#"
            SELECT id, name, secret
            FROM apps
            WHERE id = $1
            "#,
        )
        .bind(app_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some((id, name, secret)) => Ok(App {
                id: AppId(id),
                name,
                secret,
            }),
            None => Err(StorageError::AppNotFound(app_id)),
        }
    }
}

#[async_trait]
impl DirectoryAdmin for PostgresCredentialStore {
    async fn provision_app(&self, app: &App) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO apps (id, name, secret)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, secret = EXCLUDED.secret
            "#,
        )
        .bind(app.id.0)
        .bind(&app.name)
        .bind(&app.secret)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_admin = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.0)
        .bind(is_admin)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::UserNotFound);
        }

        Ok(())
    }
}
