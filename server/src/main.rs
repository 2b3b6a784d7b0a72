mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;
use std::time::Duration;

use config::{ConfigError, ServerConfig, SessionBackend};
use rate_limit::{LoginRateLimiter, RateLimitConfig};
use services::session::{self, MemorySessionStore, PgSessionStore, SessionStore};

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);
const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "jiumetrics server exited");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Postgres => Arc::new(PgSessionStore::new(pool.clone(), config.session_ttl)),
        SessionBackend::Memory => {
            tracing::warn!("using in-memory sessions; every login is lost on restart");
            Arc::new(MemorySessionStore::new(config.session_ttl))
        }
    };
    if config.mail.is_none() && !config.echo_login_codes {
        tracing::warn!("RESEND_API_KEY/RESEND_FROM not set; login codes cannot be delivered");
    }

    let rate_limiter = LoginRateLimiter::new(RateLimitConfig::from_env());
    let _pruner = rate_limiter.spawn_prune_task(RATE_LIMIT_PRUNE_INTERVAL);

    let _session_sweeper = session::spawn_prune_task(sessions.clone(), EXPIRY_SWEEP_INTERVAL);

    let port = config.port;
    let state = state::AppState::new(pool, sessions, rate_limiter, config);
    let _code_sweeper = state.login_codes.spawn_prune_task(EXPIRY_SWEEP_INTERVAL);

    let app = match routes::leptos_app(state.clone()) {
        Ok(app) => app,
        Err(e) => {
            tracing::warn!(error = %e, "leptos frontend unavailable; serving API only");
            routes::api_routes(state)
        }
    };

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(%port, "jiumetrics listening");
    axum::serve(listener, app).await?;
    Ok(())
}
