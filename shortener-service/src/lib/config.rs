use std::env;

use auth::PasswordAlgorithm;
use auth::PasswordError;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::SecretString;
use serde::Deserialize;

pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Token lifetime must be positive and at most a year.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&self.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}, got {}",
                MAX_JWT_EXPIRATION_HOURS, self.expiration_hours
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn password_algorithm(&self) -> Result<PasswordAlgorithm, PasswordError> {
        self.password_algorithm.parse()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `PORT` for the HTTP port
    /// 2. Environment variables (DATABASE__URL, JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", i64::from(DEFAULT_HTTP_PORT))?
            .set_default(
                "database.max_connections",
                i64::from(DEFAULT_MAX_CONNECTIONS),
            )?
            .set_default("jwt.expiration_hours", DEFAULT_JWT_EXPIRATION_HOURS)?
            .set_default(
                "auth.password_algorithm",
                PasswordAlgorithm::default().as_str(),
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("server.http_port", env::var("PORT").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}
