use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use terraclaim_api::background;
use terraclaim_api::config::ServerConfig;
use terraclaim_api::router::build_app_router;
use terraclaim_api::state::AppState;

/// How long background sweeps get to finish after shutdown starts.
const SWEEP_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let pool = connect_database(&config).await;
    let state = AppState::new(pool, config.clone());

    let cancel = CancellationToken::new();
    let sweeps = spawn_sweeps(&state, &config, &cancel);

    let app = build_app_router(state, &config);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Claim server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Stopped accepting connections, stopping sweeps");
    cancel.cancel();
    for handle in sweeps {
        if tokio::time::timeout(SWEEP_SHUTDOWN_GRACE, handle).await.is_err() {
            tracing::warn!("Background sweep did not stop in time");
        }
    }
    tracing::info!("Graceful shutdown complete");
}

/// `RUST_LOG` picks levels; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "terraclaim_api=debug,terraclaim_db=info,tower_http=info".into());

    let fmt_layer = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn connect_database(config: &ServerConfig) -> terraclaim_db::DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = terraclaim_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    terraclaim_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    terraclaim_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        max_connections = config.database_max_connections,
        "Database ready"
    );
    pool
}

/// Start the territory lifecycle sweep and the idle claim-path sweep.
fn spawn_sweeps(
    state: &AppState,
    config: &ServerConfig,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(background::lifecycle_sweep::run(
            state.pool.clone(),
            Duration::from_secs(config.lifecycle_sweep_interval_secs),
            cancel.clone(),
        )),
        tokio::spawn(background::session_sweep::run(
            Arc::clone(&state.sessions),
            Duration::from_secs(config.session_sweep_interval_secs),
            config.path_inactivity_timeout(),
            cancel.clone(),
        )),
    ]
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
