//! Database configuration and environment variable handling.

use std::env;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Database name; replaces the database segment of `database_url` when set
    pub database_name: Option<String>,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
    /// Server-side `statement_timeout` applied to every pooled connection
    pub statement_timeout_ms: u64,
    /// Upper bound on one repository call, retries included
    pub operation_timeout_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_name: None,
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
            statement_timeout_ms: 15_000,
            operation_timeout_ms: 60_000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `DATABASE_NAME`: Database name override (optional)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    /// - `PG_STATEMENT_TIMEOUT_MS`: Per-statement timeout (default: 15000)
    /// - `PG_OPERATION_TIMEOUT_MS`: Per-call deadline, retries included (default: 60000)
    ///
    /// # Errors
    /// Returns an error if no connection string is set.
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("PG_DATABASE_URL"))
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let database_name = env::var("DATABASE_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty());

        let defaults = Self::default();
        Ok(Self {
            database_url,
            database_name,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
            statement_timeout_ms: env_or("PG_STATEMENT_TIMEOUT_MS", defaults.statement_timeout_ms),
            operation_timeout_ms: env_or("PG_OPERATION_TIMEOUT_MS", defaults.operation_timeout_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Set the database name override.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// The URL actually used to connect.
    ///
    /// When `database_name` is set it replaces the path segment of
    /// `database_url`; any query string is preserved.
    ///
    /// # Example
    /// ```
    /// use property_api::db::PostgresConfig;
    ///
    /// let config = PostgresConfig::with_url("postgres://u:p@localhost:5432/app?sslmode=disable")
    ///     .with_database_name("listings");
    /// assert_eq!(
    ///     config.connection_url(),
    ///     "postgres://u:p@localhost:5432/listings?sslmode=disable"
    /// );
    /// ```
    pub fn connection_url(&self) -> String {
        let Some(name) = self.database_name.as_deref() else {
            return self.database_url.clone();
        };

        let (base, query) = match self.database_url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (self.database_url.as_str(), None),
        };

        // Keep scheme and authority; everything after the first path slash is the database
        let authority_start = base.find("://").map_or(0, |i| i + 3);
        let host_part = match base[authority_start..].find('/') {
            Some(slash) => &base[..authority_start + slash],
            None => base,
        };

        match query {
            Some(query) => format!("{}/{}?{}", host_part, name, query),
            None => format!("{}/{}", host_part, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_url_without_name_is_unchanged() {
        let config = PostgresConfig::with_url("postgres://localhost/app");
        assert_eq!(config.connection_url(), "postgres://localhost/app");
    }

    #[test]
    fn test_connection_url_replaces_database() {
        let config = PostgresConfig::with_url("postgres://u:p@db:5432/app").with_database_name("x");
        assert_eq!(config.connection_url(), "postgres://u:p@db:5432/x");
    }

    #[test]
    fn test_connection_url_appends_missing_database() {
        let config = PostgresConfig::with_url("postgres://db:5432").with_database_name("x");
        assert_eq!(config.connection_url(), "postgres://db:5432/x");

        let config =
            PostgresConfig::with_url("postgres://db:5432?sslmode=require").with_database_name("x");
        assert_eq!(config.connection_url(), "postgres://db:5432/x?sslmode=require");
    }

    #[test]
    fn test_defaults() {
        let config = PostgresConfig::default();
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.connection_timeout_sec, 30);
        assert_eq!(config.idle_timeout_sec, 600);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 100);
        assert_eq!(config.statement_timeout_ms, 15_000);
        assert_eq!(config.operation_timeout_ms, 60_000);
        assert!(config.database_name.is_none());
    }
}
