use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Upper bound on pooled database connections (default: `20`).
    pub database_max_connections: u32,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Idle time after which an unfinished claim path is discarded (default: `600`).
    pub path_inactivity_timeout_secs: u64,
    /// Interval between territory lifecycle sweeps (default: `3600`).
    pub lifecycle_sweep_interval_secs: u64,
    /// Interval between idle claim-path sweeps (default: `60`).
    pub session_sweep_interval_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `DATABASE_MAX_CONNECTIONS`       | `20`                    |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `PATH_INACTIVITY_TIMEOUT_SECS`   | `600`                   |
    /// | `LIFECYCLE_SWEEP_INTERVAL_SECS`  | `3600`                  |
    /// | `SESSION_SWEEP_INTERVAL_SECS`    | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse().expect("DATABASE_MAX_CONNECTIONS must be a valid u32"))
            .unwrap_or(20);
        assert!(database_max_connections > 0, "DATABASE_MAX_CONNECTIONS must be greater than zero");

        Self {
            host,
            port,
            cors_origins,
            database_max_connections,
            request_timeout_secs: secs_from_env("REQUEST_TIMEOUT_SECS", 30),
            path_inactivity_timeout_secs: secs_from_env("PATH_INACTIVITY_TIMEOUT_SECS", 600),
            lifecycle_sweep_interval_secs: secs_from_env("LIFECYCLE_SWEEP_INTERVAL_SECS", 3600),
            session_sweep_interval_secs: secs_from_env("SESSION_SWEEP_INTERVAL_SECS", 60),
            jwt: JwtConfig::from_env(),
        }
    }

    pub fn path_inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.path_inactivity_timeout_secs)
    }
}

/// Read a positive number of seconds, panicking on malformed or zero values.
fn secs_from_env(name: &str, default: u64) -> u64 {
    let secs: u64 = std::env::var(name)
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{name} must be a valid u64")))
        .unwrap_or(default);
    assert!(secs > 0, "{name} must be greater than zero");
    secs
}
