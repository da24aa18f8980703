use crate::auth::jwt::JwtConfig;

/// Which [`PersistenceGateway`](tutorhub_core::gateway::PersistenceGateway)
/// the server runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via sqlx, reached at `DATABASE_URL`.
    Postgres { database_url: String },
    /// Process-local in-memory store. Data is lost on restart.
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Idle time after which a wizard session may be swept (default: `120`).
    pub wizard_session_ttl_mins: i64,
    /// UTC offset used for `start_display` in course listings (default: `0`).
    pub display_utc_offset_minutes: i32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `STORAGE_BACKEND`            | `postgres`              |
    /// | `DATABASE_URL`               | required for `postgres` |
    /// | `JWT_SECRET`                 | required                |
    /// | `WIZARD_SESSION_TTL_MINS`    | `120`                   |
    /// | `DISPLAY_UTC_OFFSET_MINUTES` | `0`                     |
    ///
    /// # Panics
    ///
    /// Panics on malformed values or a missing required variable, so a
    /// misconfigured server fails at startup.
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

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .trim()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .expect("DATABASE_URL must be set when STORAGE_BACKEND=postgres"),
            },
            other => panic!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let wizard_session_ttl_mins: i64 = std::env::var("WIZARD_SESSION_TTL_MINS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("WIZARD_SESSION_TTL_MINS must be a valid i64");

        let display_utc_offset_minutes: i32 = std::env::var("DISPLAY_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("DISPLAY_UTC_OFFSET_MINUTES must be a valid i32");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage,
            jwt,
            wizard_session_ttl_mins,
            display_utc_offset_minutes,
        }
    }

    pub fn wizard_session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.wizard_session_ttl_mins)
    }
}
