use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `DATABASE_URL`; without it the service runs on in-memory stores.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub query_timeout_ms: u64,
    pub enable_query_logging: bool,
    pub enable_slow_query_warning: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_hours: i64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub operation_timeout_ms: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?}")]
    MissingJwtSecret(Environment),

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.enable_slow_query_warning
            .then(|| Duration::from_millis(self.slow_query_threshold_ms))
    }
}

impl CacheConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl SecurityConfig {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expiry_minutes)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.refresh_token_expiry_hours)
    }
}

fn override_from<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(v) = env::var(key) {
        if let Ok(parsed) = v.parse() {
            *target = parsed;
        }
    }
}

fn optional_from(key: &str, target: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        let v = v.trim();
        *target = if v.is_empty() { None } else { Some(v.to_string()) };
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        override_from("PORT", &mut self.server.port);

        // Database overrides
        optional_from("DATABASE_URL", &mut self.database.url);
        override_from("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_from("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        override_from("DATABASE_QUERY_TIMEOUT_MS", &mut self.database.query_timeout_ms);
        override_from("DATABASE_ENABLE_QUERY_LOGGING", &mut self.database.enable_query_logging);
        override_from("DATABASE_ENABLE_SLOW_QUERY_WARNING", &mut self.database.enable_slow_query_warning);
        override_from("DATABASE_SLOW_QUERY_THRESHOLD_MS", &mut self.database.slow_query_threshold_ms);

        override_from("PAGINATION_DEFAULT_PAGE_SIZE", &mut self.pagination.default_page_size);

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        override_from("SECURITY_ACCESS_TOKEN_EXPIRY_MINUTES", &mut self.security.access_token_expiry_minutes);
        override_from("SECURITY_REFRESH_TOKEN_EXPIRY_HOURS", &mut self.security.refresh_token_expiry_hours);
        override_from("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        // Cache overrides
        optional_from("REDIS_URL", &mut self.cache.redis_url);
        override_from("CACHE_OPERATION_TIMEOUT_MS", &mut self.cache.operation_timeout_ms);

        self
    }

    /// Startup checks; the service refuses to run on a config that fails them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development && self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret(self.environment));
        }
        if let Some(url) = &self.database.url {
            url::Url::parse(url).map_err(|_| ConfigError::InvalidUrl("DATABASE_URL"))?;
        }
        if let Some(url) = &self.cache.redis_url {
            url::Url::parse(url).map_err(|_| ConfigError::InvalidUrl("REDIS_URL"))?;
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                query_timeout_ms: 10_000,
                enable_query_logging: true,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 100,
            },
            pagination: PaginationConfig { default_page_size: 20 },
            security: SecurityConfig {
                jwt_secret: "dpms-development-secret".to_string(),
                access_token_expiry_minutes: 60,
                refresh_token_expiry_hours: 24 * 7,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            cache: CacheConfig { redis_url: None, operation_timeout_ms: 2_000 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                query_timeout_ms: 5_000,
                enable_query_logging: true,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 500,
            },
            pagination: PaginationConfig { default_page_size: 20 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_expiry_minutes: 30,
                refresh_token_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            cache: CacheConfig { redis_url: None, operation_timeout_ms: 1_000 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                query_timeout_ms: 3_000,
                enable_query_logging: false,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 1000,
            },
            pagination: PaginationConfig { default_page_size: 20 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_expiry_minutes: 15,
                refresh_token_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            cache: CacheConfig { redis_url: None, operation_timeout_ms: 500 },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.database.slow_query_threshold(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = AppConfig::production();
        assert_eq!(config.validate(), Err(ConfigError::MissingJwtSecret(Environment::Production)));
        config.security.jwt_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.access_token_ttl(), chrono::Duration::minutes(15));
    }

    #[test]
    fn test_rejects_unparseable_urls() {
        let mut config = AppConfig::development();
        config.cache.redis_url = Some("not a url".to_string());
        assert_eq!(config.validate(), Err(ConfigError::InvalidUrl("REDIS_URL")));
    }
}
