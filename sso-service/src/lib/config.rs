use std::env;
use std::time::Duration;

use auth::HashingCost;
use auth::PasswordHasher;
use auth::TokenIssuer;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::identity::models::App;
use crate::domain::identity::models::AppId;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Absent means the in-memory credential store is used
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub grpc_port: u16,
    pub http_port: u16,
    /// Per-request deadline applied by the gRPC server
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        let cost = HashingCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// App registration provisioned into the store at startup.
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub id: i32,
    pub name: String,
    pub secret: String,
    /// Overrides `token.ttl_secs` for this app
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn to_app(&self) -> App {
        App {
            id: AppId(self.id),
            name: self.name.clone(),
            secret: self.secret.as_bytes().to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (TOKEN__TTL_SECS, SERVER__GRPC_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: TOKEN__TTL_SECS=600 overrides token.ttl_secs
            .add_source(Self::environment())
            .build()?;

        Self::from_config(configuration)
    }

    /// Unprefixed variables, `__` between nesting levels, numbers and
    /// booleans parsed from their text.
    fn environment() -> Environment {
        Environment::default().separator("__").try_parsing(true)
    }

    /// Deserialize and validate an already assembled configuration.
    pub fn from_config(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = configuration.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.ttl_secs == 0 {
            return Err(ConfigError::Message(
                "token.ttl_secs must be greater than zero".to_string(),
            ));
        }

        self.password_hasher()?;

        for (index, app) in self.apps.iter().enumerate() {
            if app.id <= 0 {
                return Err(ConfigError::Message(format!(
                    "apps[{}].id must be positive",
                    index
                )));
            }
            if app.secret.is_empty() {
                return Err(ConfigError::Message(format!(
                    "apps[{}].secret must not be empty",
                    index
                )));
            }
            if app.token_ttl_secs == Some(0) {
                return Err(ConfigError::Message(format!(
                    "apps[{}].token_ttl_secs must be greater than zero",
                    index
                )));
            }
            if self.apps[..index].iter().any(|other| other.id == app.id) {
                return Err(ConfigError::Message(format!(
                    "apps[{}].id {} is declared more than once",
                    index, app.id
                )));
            }
        }

        Ok(())
    }

    /// Hasher configured with the deployment's work factor.
    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::with_cost(HashingCost::new(
            self.hashing.memory_kib,
            self.hashing.iterations,
            self.hashing.parallelism,
        ))
        .map_err(|e| ConfigError::Message(format!("hashing: {}", e)))
    }

    /// Issuer with the default lifetime and every per-app override.
    pub fn token_issuer(&self) -> TokenIssuer {
        self.apps.iter().fold(
            TokenIssuer::new(Duration::from_secs(self.token.ttl_secs)),
            |issuer, app| match app.token_ttl_secs {
                Some(ttl) => issuer.with_app_ttl(app.id, Duration::from_secs(ttl)),
                None => issuer,
            },
        )
    }
}
