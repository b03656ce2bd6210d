use std::env;
use std::sync::Arc;

use auth::Authenticator;
use auth::HashingParams;
use auth::PasswordHasher;
use auth::TokenCodec;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let params = HashingParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

impl From<PasswordConfig> for HashingParams {
    fn from(config: PasswordConfig) -> Self {
        HashingParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

/// One year.
const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

fn default_max_connections() -> u32 {
    5
}

fn default_expiration_minutes() -> i64 {
    TokenCodec::DEFAULT_TTL_MINUTES
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.jwt.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must be between 1 and {}",
                MAX_EXPIRATION_MINUTES
            )));
        }
        Ok(())
    }

    /// Build the process-wide credential facility from the loaded settings.
    ///
    /// # Errors
    /// * `ConfigError` - Settings fail validation or Argon2 rejects the cost parameters
    pub fn authenticator(&self) -> Result<Arc<Authenticator>, ConfigError> {
        self.validate()?;

        let ttl = chrono::Duration::try_minutes(self.jwt.expiration_minutes).ok_or_else(|| {
            ConfigError::Message("jwt.expiration_minutes is out of range".into())
        })?;
        let password_hasher = PasswordHasher::with_params(self.password.into())
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        let token_codec = TokenCodec::new(self.jwt.secret.as_bytes()).with_ttl(ttl);

        Ok(Arc::new(Authenticator::new(password_hasher, token_codec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, expiration_minutes: i64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgresql://localhost/identity".to_string(),
                max_connections: 5,
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_minutes,
            },
            password: PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        assert!(config("  ", 30).validate().is_err());
        assert!(config("secret", 0).validate().is_err());
        assert!(config("secret", 30).validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_expiration() {
        assert!(config("secret", MAX_EXPIRATION_MINUTES).validate().is_ok());
        assert!(config("secret", MAX_EXPIRATION_MINUTES + 1).validate().is_err());
        assert!(config("secret", i64::MAX).validate().is_err());
        assert!(config("secret", i64::MAX).authenticator().is_err());
    }

    #[test]
    fn test_authenticator_rejects_bad_argon2_params() {
        let mut config = config("secret", 30);
        config.password.memory_kib = 1;

        assert!(config.authenticator().is_err());
    }

    #[test]
    fn test_load_applies_environment_overrides() {
        env::set_var("JWT__SECRET", "from-environment-secret");
        env::set_var("DATABASE__URL", "postgresql://env-host/identity");

        let loaded = Config::load();

        env::remove_var("JWT__SECRET");
        env::remove_var("DATABASE__URL");

        let loaded = loaded.expect("Failed to load configuration");
        assert_eq!(loaded.jwt.secret, "from-environment-secret");
        assert_eq!(loaded.database.url, "postgresql://env-host/identity");
        assert_eq!(loaded.server.http_port, 8080);
    }

    #[test]
    fn test_authenticator_from_config() {
        let authenticator = config("secret", 30)
            .authenticator()
            .expect("Failed to build authenticator");

        let token = authenticator.issue_token("user123").expect("Failed to issue token");
        assert_eq!(authenticator.verify_token(&token), Ok("user123".to_string()));
    }

    #[test]
    fn test_password_config_defaults_match_argon2() {
        let params: HashingParams = PasswordConfig::default().into();
        assert_eq!(params, HashingParams::default());
    }
}
