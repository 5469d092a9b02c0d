use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::SigningApp;
use auth::TokenIssuer;
use auth::TokenSubject;

use crate::domain::identity::models::AppId;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::identity::errors::AuthError;
use crate::identity::errors::StorageError;
use crate::identity::ports::AppRepository;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::UserRepository;

// Verified against when the email is unknown so both failure paths cost one hash.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalisation-dummy";

/// Domain service implementation for login, registration and admin checks.
///
/// Stateless apart from read-only configuration, so one instance is shared by
/// every request.
pub struct AuthService<UR, AR>
where
    UR: UserRepository,
    AR: AppRepository,
{
    users: Arc<UR>,
    apps: Arc<AR>,
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    dummy_hash: String,
}

impl<UR, AR> AuthService<UR, AR>
where
    UR: UserRepository,
    AR: AppRepository,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `apps` - App registry implementation
    /// * `password_hasher` - Hasher configured with the deployment's cost
    /// * `token_issuer` - Issuer configured with token lifetimes
    ///
    /// # Errors
    /// * `PasswordError` - The hasher cannot produce the timing dummy hash
    pub fn new(
        users: Arc<UR>,
        apps: Arc<AR>,
        password_hasher: PasswordHasher,
        token_issuer: TokenIssuer,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = password_hasher.hash(TIMING_DUMMY_PASSWORD)?;

        Ok(Self {
            users,
            apps,
            password_hasher,
            token_issuer,
            dummy_hash,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?
    }

    /// Look the user up and check the password.
    ///
    /// Every failure that depends on the credentials collapses into
    /// `InvalidCredentials`; only infrastructure failures escape as `Internal`.
    async fn authenticate(
        &self,
        op: &'static str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => Some(user),
            Err(StorageError::UserNotFound) => None,
            Err(e) => {
                tracing::error!(op, email, error = %e, "Failed to get user");
                return Err(AuthError::internal(op, e));
            }
        };

        let stored_hash = user
            .as_ref()
            .map_or(self.dummy_hash.as_str(), |u| u.password_hash.as_str());

        let matches = self
            .verify_password(password, stored_hash)
            .await
            .map_err(|e| {
                tracing::error!(op, email, error = %e, "Failed to verify password");
                AuthError::internal(op, e)
            })?;

        match user {
            Some(user) if matches => Ok(user),
            Some(_) => {
                tracing::info!(op, email, "Invalid credentials: password mismatch");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                tracing::warn!(op, email, "Invalid credentials: user not found");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[async_trait]
impl<UR, AR> AuthServicePort for AuthService<UR, AR>
where
    UR: UserRepository,
    AR: AppRepository,
{
    async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: AppId,
    ) -> Result<String, AuthError> {
        const OP: &str = "auth.login";

        tracing::info!(op = OP, email, app_id = app_id.0, "Logging in user");

        if app_id.0 <= 0 {
            tracing::warn!(op = OP, app_id = app_id.0, "Rejected non-positive app id");
            return Err(AuthError::InvalidAppId);
        }

        let user = self.authenticate(OP, email, password).await?;

        let app = self.apps.find_by_id(app_id).await.map_err(|e| {
            tracing::error!(op = OP, app_id = app_id.0, error = %e, "Failed to get app");
            AuthError::internal(OP, e)
        })?;

        let subject = TokenSubject {
            user_id: user.id.0,
            email: &user.email,
        };
        let signing_app = SigningApp {
            app_id: app.id.0,
            secret: &app.secret,
        };

        let issued = self
            .token_issuer
            .issue(&subject, &signing_app)
            .map_err(|e| {
                tracing::error!(op = OP, app_id = app_id.0, error = %e, "Failed to generate token");
                AuthError::internal(OP, e)
            })?;

        tracing::info!(
            op = OP,
            user_id = user.id.0,
            app_id = app.id.0,
            expires_at = %issued.expires_at,
            "User logged in"
        );

        Ok(issued.token)
    }

    async fn register_new_user(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        const OP: &str = "auth.register_new_user";

        tracing::info!(op = OP, email, "Registering user");

        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let password_hash = self.hash_password(password).await.map_err(|e| {
            tracing::error!(op = OP, email, error = %e, "Failed to generate password hash");
            AuthError::internal(OP, e)
        })?;

        let user_id = self
            .users
            .create(email, &password_hash)
            .await
            .map_err(|e| match e {
                StorageError::UserAlreadyExists(_) => {
                    tracing::warn!(op = OP, email, "User already exists");
                    AuthError::UserAlreadyExists
                }
                e => {
                    tracing::error!(op = OP, email, error = %e, "Failed to save user");
                    AuthError::internal(OP, e)
                }
            })?;

        tracing::info!(op = OP, user_id = user_id.0, "User registered");

        Ok(user_id)
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        tracing::info!(op = OP, user_id = user_id.0, "Checking if user is admin");

        if user_id.0 <= 0 {
            return Err(AuthError::UserNotFound);
        }

        let is_admin = self.users.is_admin(user_id).await.map_err(|e| match e {
            StorageError::UserNotFound => {
                tracing::warn!(op = OP, user_id = user_id.0, "User not found");
                AuthError::UserNotFound
            }
            e => {
                tracing::error!(op = OP, user_id = user_id.0, error = %e, "Failed to read admin flag");
                AuthError::internal(OP, e)
            }
        })?;

        tracing::info!(op = OP, user_id = user_id.0, is_admin, "Checked if user is admin");

        Ok(is_admin)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use auth::HashingCost;
    use auth::JwtHandler;
    use auth::SessionClaims;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::identity::models::App;

    const APP_SECRET: &[u8] = b"test-secret";
    const TOKEN_TTL: Duration = Duration::from_secs(3600);

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, email: &str, password_hash: &str) -> Result<UserId, StorageError>;
            async fn find_by_email(&self, email: &str) -> Result<User, StorageError>;
            async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError>;
        }
    }

    mock! {
        pub TestAppRepository {}

        #[async_trait]
        impl AppRepository for TestAppRepository {
            async fn find_by_id(&self, app_id: AppId) -> Result<App, StorageError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(HashingCost::new(1024, 1, 1)).unwrap()
    }

    fn service(
        users: MockTestUserRepository,
        apps: MockTestAppRepository,
    ) -> AuthService<MockTestUserRepository, MockTestAppRepository> {
        AuthService::new(
            Arc::new(users),
            Arc::new(apps),
            hasher(),
            TokenIssuer::new(TOKEN_TTL),
        )
        .unwrap()
    }

    fn stored_user(password: &str) -> User {
        User {
            id: UserId(1),
            email: "a@x.com".to_string(),
            password_hash: hasher().hash(password).unwrap(),
        }
    }

    fn test_app() -> App {
        App {
            id: AppId(1),
            name: "test".to_string(),
            secret: APP_SECRET.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        let user = stored_user("pw123");
        users
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(move |_| Ok(user.clone()));
        apps.expect_find_by_id()
            .withf(|id| *id == AppId(1))
            .times(1)
            .returning(|_| Ok(test_app()));

        let service = service(users, apps);

        let login_time = Utc::now().timestamp();
        let token = service
            .login("a@x.com", "pw123", AppId(1))
            .await
            .expect("Login failed");

        let claims: SessionClaims = JwtHandler::new(APP_SECRET)
            .unwrap()
            .decode(&token)
            .expect("Token validation failed");
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.app_id, 1);
        assert!((claims.exp - (login_time + TOKEN_TTL.as_secs() as i64)).abs() <= 1);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        let user = stored_user("pw123");
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(user.clone()));
        apps.expect_find_by_id().times(0);

        let result = service(users, apps)
            .login("a@x.com", "wrong", AppId(1))
            .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_indistinguishable() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        users
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(StorageError::UserNotFound));
        apps.expect_find_by_id().times(0);

        let result = service(users, apps)
            .login("nobody@x.com", "pw123", AppId(1))
            .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_dummy_password_does_not_authenticate_unknown_user() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(StorageError::UserNotFound));

        let result = service(users, apps)
            .login("nobody@x.com", TIMING_DUMMY_PASSWORD, AppId(1))
            .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_store_failure_is_internal() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(StorageError::Database("connection refused".to_string())));

        let result = service(users, apps)
            .login("a@x.com", "pw123", AppId(1))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Internal {
                op: "auth.login",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_app_is_internal() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        let user = stored_user("pw123");
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(user.clone()));
        apps.expect_find_by_id()
            .times(1)
            .returning(|id| Err(StorageError::AppNotFound(id)));

        let result = service(users, apps)
            .login("a@x.com", "pw123", AppId(99))
            .await;

        assert!(matches!(result, Err(AuthError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_login_rejects_non_positive_app_id() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        users.expect_find_by_email().times(0);
        apps.expect_find_by_id().times(0);

        let result = service(users, apps)
            .login("a@x.com", "pw123", AppId(0))
            .await;

        assert_eq!(result, Err(AuthError::InvalidAppId));
    }

    #[tokio::test]
    async fn test_login_app_with_empty_secret_is_internal() {
        let mut users = MockTestUserRepository::new();
        let mut apps = MockTestAppRepository::new();

        let user = stored_user("pw123");
        users
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(user.clone()));
        apps.expect_find_by_id().times(1).returning(|id| {
            Ok(App {
                id,
                name: "broken".to_string(),
                secret: Vec::new(),
            })
        });

        let result = service(users, apps)
            .login("a@x.com", "pw123", AppId(1))
            .await;

        assert!(matches!(result, Err(AuthError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_create()
            .withf(|email, password_hash| {
                email == "a@x.com"
                    && password_hash.starts_with("$argon2id$")
                    && hasher().verify("pw123", password_hash).unwrap_or(false)
            })
            .times(1)
            .returning(|_, _| Ok(UserId(1)));

        let result = service(users, apps).register_new_user("a@x.com", "pw123").await;

        assert_eq!(result, Ok(UserId(1)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_create()
            .times(1)
            .returning(|email, _| Err(StorageError::UserAlreadyExists(email.to_string())));

        let result = service(users, apps).register_new_user("a@x.com", "pw2").await;

        assert_eq!(result, Err(AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_store_failure_is_internal() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_create()
            .times(1)
            .returning(|_, _| Err(StorageError::Database("disk full".to_string())));

        let result = service(users, apps).register_new_user("a@x.com", "pw123").await;

        assert!(matches!(
            result,
            Err(AuthError::Internal {
                op: "auth.register_new_user",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users.expect_create().times(0);

        let service = service(users, apps);

        assert_eq!(
            service.register_new_user("", "pw123").await,
            Err(AuthError::MissingField("email"))
        );
        assert_eq!(
            service.register_new_user("a@x.com", "").await,
            Err(AuthError::MissingField("password"))
        );
    }

    #[tokio::test]
    async fn test_is_admin() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_is_admin()
            .withf(|id| *id == UserId(1))
            .times(1)
            .returning(|_| Ok(true));
        users
            .expect_is_admin()
            .withf(|id| *id == UserId(2))
            .times(1)
            .returning(|_| Ok(false));

        let service = service(users, apps);

        assert_eq!(service.is_admin(UserId(1)).await, Ok(true));
        assert_eq!(service.is_admin(UserId(2)).await, Ok(false));
    }

    #[tokio::test]
    async fn test_is_admin_unknown_user() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_is_admin()
            .times(1)
            .returning(|_| Err(StorageError::UserNotFound));

        let result = service(users, apps).is_admin(UserId(42)).await;

        assert_eq!(result, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_is_admin_non_positive_id_skips_store() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users.expect_is_admin().times(0);

        let result = service(users, apps).is_admin(UserId(0)).await;

        assert_eq!(result, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_is_admin_store_failure_is_internal() {
        let mut users = MockTestUserRepository::new();
        let apps = MockTestAppRepository::new();

        users
            .expect_is_admin()
            .times(1)
            .returning(|_| Err(StorageError::Database("timeout".to_string())));

        let result = service(users, apps).is_admin(UserId(1)).await;

        assert!(matches!(result, Err(AuthError::Internal { .. })));
    }
}
