//! Application configuration.
//!
//! Values come from the environment in production (`AppConfig::from_env`)
//! and from the builder-style setters in tests.

use chrono::Duration;

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server address (e.g., "smtp.example.com").
    pub server: String,

    /// SMTP server port.
    pub port: u16,

    /// SMTP authentication username.
    pub username: String,

    /// SMTP authentication password.
    pub password: String,

    /// Sender email address.
    pub from_email: String,

    /// Sender display name.
    pub from_name: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the server binds to.
    pub bind_addr: String,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Redis connection URL; when unset, sessions are kept in process.
    pub redis_url: Option<String>,

    /// Session time to live (sliding).
    pub session_ttl: Duration,

    /// SMTP relay; when unset, confirmation emails go to the log.
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `BIND_ADDR`, `DATABASE_URL` (required),
    /// `REDIS_URL`, `SESSION_TTL_HOURS`, and the `SMTP_SERVER`/`SMTP_PORT`/
    /// `SMTP_USERNAME`/`SMTP_PASSWORD`/`SMTP_FROM_EMAIL`/`SMTP_FROM_NAME`
    /// group (enabled when `SMTP_SERVER` is set).
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is missing or a numeric variable
    /// does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        let redis_url = std::env::var("REDIS_URL").ok();

        let session_ttl_hours = match std::env::var("SESSION_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("SESSION_TTL_HOURS must be an integer"))?,
            Err(_) => 24,
        };

        let smtp = match std::env::var("SMTP_SERVER") {
            Ok(server) => {
                let port = match std::env::var("SMTP_PORT") {
                    Ok(raw) => raw
                        .parse::<u16>()
                        .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a port number"))?,
                    Err(_) => 587,
                };
                Some(SmtpConfig {
                    server,
                    port,
                    username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
                    password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
                    from_email: std::env::var("SMTP_FROM_EMAIL")
                        .unwrap_or_else(|_| "noreply@localhost".to_string()),
                    from_name: std::env::var("SMTP_FROM_NAME")
                        .unwrap_or_else(|_| "Gather".to_string()),
                })
            }
            Err(_) => None,
        };

        Ok(Self {
            bind_addr,
            database_url,
            redis_url,
            session_ttl: Duration::hours(session_ttl_hours),
            smtp,
        })
    }

    /// Set the session time to live.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            database_url: "postgresql://localhost/gather".to_string(),
            redis_url: None,
            session_ttl: Duration::hours(24),
            smtp: None,
        }
    }
}
