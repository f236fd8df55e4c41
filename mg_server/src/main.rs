//! Mini-games HTTP server.
//!
//! Hosts the session registry and statistics store behind the JSON API in
//! [`mg_server::api`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::{info, warn};
use mg_server::{api, config::ServerConfig, logging, metrics};
use mini_games::{
    SessionManager,
    db::Database,
    stats::{InMemoryStatsRepository, PgStatsRepository, StatsRepository},
};
use pico_args::Arguments;

const HELP: &str = "\
Run the chat mini-games server

USAGE:
  mg_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url        URL      Statistics database          [default: env DATABASE_URL, in-memory when unset]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled when unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SESSION_IDLE_TIMEOUT_SECS  Seconds before an unfinished game is dropped [default: 600]
  SESSION_RNG_SEED           Fixed seed for reproducible games
  DB_MAX_CONNECTIONS         Pool size [default: 10]
  RUST_LOG                   Log filter [default: info,sqlx=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics-bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url, metrics_bind)?;
    info!("Starting mini-games server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let (stats, database): (Arc<dyn StatsRepository>, Option<Database>) = match &config.database {
        Some(db_config) => {
            info!("Connecting to statistics database");
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            let repository = PgStatsRepository::new(db.pool().clone());
            repository.init_schema().await?;
            info!("Database connected successfully");
            (Arc::new(repository), Some(db))
        }
        None => {
            warn!("DATABASE_URL not set; statistics are kept in memory and lost on restart");
            (Arc::new(InMemoryStatsRepository::new()), None)
        }
    };

    let session_manager = Arc::new(SessionManager::new(stats.clone(), config.session.clone()));
    let gauges = metrics::spawn_session_gauges(Arc::clone(&session_manager));

    let app = api::create_router(api::AppState {
        session_manager,
        stats,
        database: database.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    gauges.abort();
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
