use config::ConfigError;
use std::fmt;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// `dev` enables human-readable logs; anything else logs JSON.
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token and credential settings, read-only after startup
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_days: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

impl AuthSettings {
    /// Settings with the production lifetimes and the given secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl_seconds: default_access_token_ttl(),
            refresh_token_ttl_days: default_refresh_token_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
            store_timeout_ms: default_store_timeout(),
        }
    }

    /// `None` when the configured value does not fit a `TimeDelta`
    pub fn access_token_ttl(&self) -> Option<chrono::TimeDelta> {
        chrono::TimeDelta::try_seconds(self.access_token_ttl_seconds)
    }

    /// `None` when the configured value does not fit a `TimeDelta`
    pub fn refresh_token_ttl(&self) -> Option<chrono::TimeDelta> {
        chrono::TimeDelta::try_days(self.refresh_token_ttl_days)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"[redacted]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_platform() -> String {
    "production".to_string()
}

fn default_access_token_ttl() -> i64 {
    3600
}

fn default_refresh_token_ttl() -> i64 {
    60
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_store_timeout() -> u64 {
    5000
}

/// Load settings from `configuration.yaml`, overridden by `APP__SECTION__KEY`
/// environment variables.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
