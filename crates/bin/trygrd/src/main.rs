//! # trygrd — trygr daemon
//!
//! Composition root that wires all adapters together and starts the engine
//! and the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise structured logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct store implementations (adapters) and the cache services
//! - Construct the trigger engine, its capability registry and notifier
//! - Spawn the bus listener and the scheduler
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use trygr_adapter_http_axum::state::AppState;
use trygr_adapter_storage_sqlite_sqlx::{SqliteDeviceStore, SqliteLocationStore};
use trygr_adapter_virtual::{VirtualCapability, VirtualMailbox};
use trygr_app::action_dispatcher::ActionDispatcher;
use trygr_app::capability_registry::CapabilityRegistry;
use trygr_app::event_bus::InProcessEventBus;
use trygr_app::notification::NotificationFanout;
use trygr_app::scheduler::Scheduler;
use trygr_app::services::device_cache_service::DeviceCacheService;
use trygr_app::services::location_cache_service::LocationCacheService;
use trygr_app::trigger_engine::{TriggerEngine, TriggerSet};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = trygr_adapter_storage_sqlite_sqlx::Config::new(config.database_url())
        .with_max_connections(config.database.max_connections)
        .build()
        .await?;
    let device_store = Arc::new(SqliteDeviceStore::new(db.pool().clone()));
    let location_store = Arc::new(SqliteLocationStore::new(db.pool().clone()));

    // Event bus and cache services
    let event_bus = InProcessEventBus::new(config.engine.bus_capacity);
    let device_service = Arc::new(DeviceCacheService::new(device_store, event_bus.clone()));
    let location_service = Arc::new(LocationCacheService::new(
        Arc::clone(&location_store),
        event_bus.clone(),
    ));

    // Trigger engine
    let triggers = Arc::new(TriggerSet::load(std::mem::take(&mut config.triggers))?);
    let registry = CapabilityRegistry::new().with(Arc::new(VirtualCapability::default()));
    let engine = Arc::new(TriggerEngine::new(
        Arc::clone(&triggers),
        ActionDispatcher::new(Arc::clone(&device_service), registry),
        NotificationFanout::new(Arc::new(VirtualMailbox::default())),
        config.engine_config(),
    ));
    tracing::info!(
        triggers = triggers.snapshot().0.len(),
        tick_secs = config.engine.tick_interval_secs,
        "trigger engine configured"
    );

    // Background tasks
    let (stop, shutdown) = watch::channel(false);
    let listener_task = tokio::spawn(
        Arc::clone(&engine).listen(event_bus.subscribe(), shutdown.clone()),
    );
    let scheduler = Scheduler::new(
        engine,
        location_store,
        config.postal_code(),
        config.tick_interval(),
    );
    let scheduler_task = tokio::spawn(scheduler.run(shutdown));

    // HTTP
    let state = AppState::new(device_service, location_service, triggers);
    let app = trygr_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "trygrd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
            if stop.send(true).is_err() {
                tracing::debug!("background tasks already stopped");
            }
        })
        .await?;

    let (listener, scheduler) = tokio::join!(listener_task, scheduler_task);
    for (task, joined) in [("trigger engine", listener), ("scheduler", scheduler)] {
        if let Err(err) = joined {
            tracing::error!(%err, task, "background task failed");
        }
    }
    Ok(())
}
