//! # smarthubd — smarthub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct the device service, action executor and scheduler
//! - Start the scheduler's firing loop
//! - Build the axum router and serve it
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use smarthub_adapter_http_axum::state::AppState;
use smarthub_adapter_storage_sqlite_sqlx::{SqliteDeviceRepository, SqliteJobRepository};
use smarthub_app::executor::ActionExecutor;
use smarthub_app::scheduler::Scheduler;
use smarthub_app::services::device_service::DeviceService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = config
        .storage()
        .build()
        .await
        .with_context(|| format!("opening database {}", config.database.url))?;
    let pool = db.pool().clone();

    // Repositories
    let device_repo = SqliteDeviceRepository::new(pool.clone());
    let executor_repo = SqliteDeviceRepository::new(pool.clone());
    let job_repo = SqliteJobRepository::new(pool);

    // Services
    let device_service = Arc::new(DeviceService::new(device_repo));
    let mut scheduler = Scheduler::new(job_repo, ActionExecutor::new(executor_repo));
    if let Some(grace) = config.misfire_grace() {
        scheduler = scheduler.with_misfire_grace(grace);
    }
    let scheduler = Arc::new(scheduler);
    let scheduler_handle = scheduler.start(config.poll_interval());

    // HTTP
    let state = AppState::from_arcs(device_service, scheduler);
    let app = smarthub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "smarthubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    scheduler_handle.shutdown().await;
    db.close().await;
    tracing::info!("smarthubd stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown requested");
}
