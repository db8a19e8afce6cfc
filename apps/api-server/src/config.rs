//! Application configuration loaded from environment variables.

use std::env;

use forum_core::domain::DEFAULT_SESSION_TTL_HOURS;
use forum_infra::JwtConfig;

#[cfg(feature = "postgres")]
use forum_infra::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
    /// Verification settings for the deprecated `user_id` cookie.
    pub legacy_identity: JwtConfig,
    pub telemetry: TelemetryConfig,
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            cookie_secure: true,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

impl AppConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.legacy_identity.secret == JwtConfig::default().secret
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
        });

        let session = SessionConfig {
            ttl_hours: parse_var("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        };

        let defaults = JwtConfig::default();
        let legacy_identity = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            ..defaults
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            session,
            legacy_identity,
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
