//! Todo-list HTTP server.
//!
//! Connects to PostgreSQL, applies migrations, wires the session manager and
//! todo repository into the router, and serves until SIGINT or SIGTERM.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Error, anyhow};
use pico_args::Arguments;
use todoex::{
    auth::{PasswordHasher, PgCredentialStore, SessionManager, TokenIssuer},
    db::Database,
    todo::PgTodoRepository,
};
use todoex_server::{
    api,
    config::{ConfigOverrides, ServerConfig},
    logging,
};
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info, warn};

const HELP: &str = "\
Run the todoex todo-list server

USAGE:
  todoex_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or DB_* variables]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET_KEY           Token signing secret (required)
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  DB_host, DB_port, DB_user, DB_password, DB_name
                           Discrete connection parameters, used without DATABASE_URL
  REQUEST_TIMEOUT_SECS     Per-request bound [default: 300]
  SHUTDOWN_TIMEOUT_SECS    Drain deadline on shutdown [default: 10]
  RUST_LOG                 Log filter [default: info,sqlx=warn,tower_http=info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let overrides = ConfigOverrides {
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    info!(bind = %config.bind, "Starting todoex server");

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {e}"))?;
    db.migrate()
        .await
        .map_err(|e| anyhow!("Failed to apply migrations: {e}"))?;
    info!("Database connected and migrated");

    let hasher = PasswordHasher::default();
    let store = Arc::new(PgCredentialStore::new(db.pool().clone(), hasher.clone()));
    let issuer = TokenIssuer::new(config.security.jwt_secret.as_bytes());
    let sessions = Arc::new(SessionManager::new(store, hasher, issuer));
    let todos = Arc::new(PgTodoRepository::new(db.pool().clone()));

    let state =
        api::AppState::new(sessions, todos).with_request_timeout(config.http.request_timeout);
    let app = api::create_router(state);

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow!("Failed to bind to {}: {e}", config.bind))?;
    info!("Server is running at http://{}. Press Ctrl+C to stop.", config.bind);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            db.close().await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(anyhow!("Server error: {e}")),
                Err(e) => Err(anyhow!("Server task failed: {e}")),
            };
        }
        _ = shutdown_signal() => {}
    }

    info!(
        deadline_secs = config.http.shutdown_timeout.as_secs(),
        "Shutting down, draining in-flight requests"
    );
    let _ = stop_tx.send(true);

    let drained = tokio::time::timeout(config.http.shutdown_timeout, &mut server).await;
    match drained {
        Ok(Ok(Ok(()))) => info!("All requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "Server task failed during shutdown"),
        Err(_) => {
            warn!("Drain deadline elapsed, abandoning in-flight requests");
            server.abort();
        }
    }

    db.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
