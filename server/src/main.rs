//! Gather server binary.
//!
//! Wires the production providers (PostgreSQL, Redis, SMTP) into the
//! router and serves HTTP. Each provider degrades to a local stand-in
//! when its configuration is absent: sessions fall back to process
//! memory without `REDIS_URL`, and confirmation emails go to the log
//! without `SMTP_SERVER`.

use gather_server::config::AppConfig;
use gather_server::providers::{
    ConsoleEmailProvider, EmailProvider, SessionStore, SmtpEmailProvider,
};
use gather_server::router::api_router;
use gather_server::state::AppState;
use gather_server::stores::{MemorySessionStore, PostgresStore, RedisSessionStore};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env()?;

    info!(
        "Connecting to PostgreSQL: {}",
        config.database_url.split('@').next_back().unwrap_or("unknown")
    );
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    let store = PostgresStore::new(pool);
    info!("Running database migrations");
    store.migrate().await?;

    match config.redis_url.clone() {
        Some(redis_url) => {
            info!("Using Redis session store");
            let sessions = RedisSessionStore::new(&redis_url).await?;
            serve_with_mailer(store, sessions, config).await
        }
        None => {
            info!("REDIS_URL not set, keeping sessions in process memory");
            serve_with_mailer(store, MemorySessionStore::new(), config).await
        }
    }
}

/// Pick the email provider, then serve.
async fn serve_with_mailer<S>(
    store: PostgresStore,
    sessions: S,
    config: AppConfig,
) -> anyhow::Result<()>
where
    S: SessionStore + Clone + Send + Sync + 'static,
{
    match config.smtp.clone() {
        Some(smtp) => {
            info!("Using SMTP email provider via {}", smtp.server);
            serve(store, sessions, SmtpEmailProvider::new(smtp), config).await
        }
        None => {
            info!("SMTP_SERVER not set, logging emails to console");
            serve(store, sessions, ConsoleEmailProvider::new(), config).await
        }
    }
}

/// Bind and serve the API until interrupted.
async fn serve<S, M>(
    store: PostgresStore,
    sessions: S,
    mailer: M,
    config: AppConfig,
) -> anyhow::Result<()>
where
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, sessions, mailer, config);
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Initialize tracing from `RUST_LOG`, defaulting to info-level logs.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
