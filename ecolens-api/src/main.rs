//! # EcoLens API Server
//!
//! HTTP backend for EcoLens: records scanned objects with their estimated
//! carbon footprint, keeps per-user running totals and serves dashboard
//! aggregates.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Registration, login and profile endpoints (JWT bearer tokens)
//! - Emission recording, listing and deletion
//! - Daily, category and period-scoped aggregates
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/ecolens JWT_SECRET=... cargo run -p ecolens-api
//! ```

use ecolens_api::{
    app::{build_router, AppState},
    config::Config,
};
use ecolens_shared::db::{migrations::run_migrations, pool::RecordStore};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "ecolens_api=debug,ecolens_shared=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    if config.api.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("EcoLens API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = RecordStore::connect(config.database.store_config()).await?;
    run_migrations(store.pool()).await?;

    let address = config.bind_address();
    let app = build_router(AppState::new(store.clone(), config));

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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

    tracing::info!("Shutdown signal received, draining connections...");
}
