//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use todoex::db::{
    DatabaseConfig,
    config::{
        DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
        DEFAULT_MAX_LIFETIME_SECS, DEFAULT_MIN_CONNECTIONS,
    },
};

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Signing secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Request and shutdown bounds
    pub http: HttpConfig,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// HTTP timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Upper bound on a single request
    pub request_timeout: Duration,
    /// How long shutdown waits for in-flight requests
    pub shutdown_timeout: Duration,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Arguments
    ///
    /// * `overrides` - CLI values taking precedence over the environment
    /// * `lookup` - Returns the value of a variable, if set
    pub fn from_lookup<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_or(&lookup, "SERVER_BIND", || {
                SocketAddr::from(([127, 0, 0, 1], 8080))
            })?,
        };

        let database_url = overrides
            .database_url
            .or_else(|| lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()))
            .or_else(|| composed_database_url(&lookup))
            .unwrap_or_else(|| DatabaseConfig::development().database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", || DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", || DEFAULT_MIN_CONNECTIONS)?,
            connection_timeout_secs: parse_or(&lookup, "DB_CONNECTION_TIMEOUT_SECS", || {
                DEFAULT_CONNECTION_TIMEOUT_SECS
            })?,
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", || {
                DEFAULT_IDLE_TIMEOUT_SECS
            })?,
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME_SECS", || {
                DEFAULT_MAX_LIFETIME_SECS
            })?,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "JWT_SECRET_KEY".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            })?;

        if jwt_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = jwt_secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "JWT_SECRET_KEY is shorter than recommended"
            );
        }

        let http = HttpConfig {
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", || {
                300
            })?),
            shutdown_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECS",
                || 10,
            )?),
        };

        Ok(ServerConfig {
            bind,
            database,
            security: SecurityConfig { jwt_secret },
            http,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        let timeouts = [
            (
                "DB_CONNECTION_TIMEOUT_SECS",
                self.database.connection_timeout_secs,
            ),
            ("REQUEST_TIMEOUT_SECS", self.http.request_timeout.as_secs()),
            ("SHUTDOWN_TIMEOUT_SECS", self.http.shutdown_timeout.as_secs()),
        ];
        for (var, secs) in timeouts {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable, falling back to `default` only when it is unset.
fn parse_or<T, F>(lookup: &F, key: &str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default()),
    }
}

/// Build a URL from `DB_host`, `DB_port`, `DB_user`, `DB_password`, `DB_name`.
///
/// Only used when `DB_host` is set; the others fall back to local defaults.
fn composed_database_url<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_host")?;
    let port = lookup("DB_port").unwrap_or_else(|| "5432".to_string());
    let user = lookup("DB_user").unwrap_or_else(|| "postgres".to_string());
    let password = lookup("DB_password").unwrap_or_default();
    let name = lookup("DB_name").unwrap_or_else(|| "todoex".to_string());

    Some(DatabaseConfig::compose_url(
        &host, &port, &user, &password, &name,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        load_with(ConfigOverrides::default(), vars)
    }

    fn load_with(
        overrides: ConfigOverrides,
        vars: &[(&str, &str)],
    ) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(overrides, |key| vars.get(key).cloned())
    }

    const SECRET: (&str, &str) = ("JWT_SECRET_KEY", "0123456789abcdef0123456789abcdef");

    #[test]
    fn test_defaults() {
        let config = load(&[SECRET]).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.http.request_timeout, Duration::from_secs(300));
        assert_eq!(config.http.shutdown_timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET_KEY"));

        let err = load(&[("JWT_SECRET_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_short_secret_is_accepted() {
        let config = load(&[("JWT_SECRET_KEY", "short")]).unwrap();
        assert_eq!(config.security.jwt_secret, "short");
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = load(&[SECRET]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains(SECRET.1));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_discrete_password_with_reserved_characters() {
        let config = load(&[
            SECRET,
            ("DB_host", "db"),
            ("DB_user", "todo"),
            ("DB_password", "p@ss/w#rd"),
            ("DB_name", "todoex"),
        ])
        .unwrap();

        assert_eq!(
            config.database.database_url,
            "postgres://todo:p%40ss%2Fw%23rd@db:5432/todoex?sslmode=disable"
        );
    }

    #[test]
    fn test_database_url_precedence() {
        let discrete = [
            SECRET,
            ("DB_host", "db"),
            ("DB_port", "6543"),
            ("DB_user", "todo"),
            ("DB_password", "pw"),
            ("DB_name", "todos"),
        ];

        let config = load(&discrete).unwrap();
        assert_eq!(
            config.database.database_url,
            "postgres://todo:pw@db:6543/todos?sslmode=disable"
        );

        let mut with_url = discrete.to_vec();
        with_url.push(("DATABASE_URL", "postgres://env@host/db"));
        let config = load(&with_url).unwrap();
        assert_eq!(config.database.database_url, "postgres://env@host/db");

        let overrides = ConfigOverrides {
            database_url: Some("postgres://cli@host/db".to_string()),
            ..Default::default()
        };
        let config = load_with(overrides, &with_url).unwrap();
        assert_eq!(config.database.database_url, "postgres://cli@host/db");
    }

    #[test]
    fn test_bind_override_wins() {
        let overrides = ConfigOverrides {
            bind: Some("0.0.0.0:9000".parse().unwrap()),
            ..Default::default()
        };
        let config = load_with(overrides, &[SECRET, ("SERVER_BIND", "127.0.0.1:1")]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let err = load(&[SECRET, ("DB_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MAX_CONNECTIONS"));

        let err = load(&[SECRET, ("SERVER_BIND", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation() {
        let config = load(&[
            SECRET,
            ("DB_MIN_CONNECTIONS", "30"),
            ("DB_MAX_CONNECTIONS", "10"),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref var, .. }) if var == "DB_MIN_CONNECTIONS"
        ));

        let config = load(&[SECRET, ("REQUEST_TIMEOUT_SECS", "0")]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref var, .. }) if var == "REQUEST_TIMEOUT_SECS"
        ));

        let config = load(&[SECRET, ("DB_MAX_CONNECTIONS", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET_KEY".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET_KEY"));
        assert!(msg.contains("Use openssl"));
    }
}
