//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

/// Default pool size ceiling.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
/// Default warm connections kept open.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
/// Default acquire timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 5;
/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
/// Default max connection lifetime in seconds.
pub const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Configuration pointing at `database_url` with default pool tuning.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::development()
        }
    }

    /// Build a URL from discrete connection parameters.
    ///
    /// User, password and database name are percent-encoded, so reserved
    /// characters such as `@`, `/` or `#` survive. TLS is disabled, matching
    /// a local or sidecar database.
    pub fn compose_url(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
        format!(
            "postgres://{}:{}@{host}:{port}/{}?sslmode=disable",
            urlencoding::encode(user),
            urlencoding::encode(password),
            urlencoding::encode(name),
        )
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/todoex` as the database URL
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/todoex".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            max_lifetime_secs: DEFAULT_MAX_LIFETIME_SECS,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
