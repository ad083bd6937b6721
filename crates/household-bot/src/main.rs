//! Household chat assistant.
//!
//! Builds every component from the environment and runs the gateway
//! listener, the prompt scheduler, audit housekeeping and the admin API
//! until Ctrl+C.

mod config;
mod maintenance;

use std::sync::Arc;
use std::time::Duration;

use admin_web::AppState;
use agent_tools::{household_registry, Backends, ToolsConfig};
use brain_core::Brain;
use chat_bridge::{BridgeClient, BridgeConfig};
use database::Database;
use message_listener::{BridgeSender, ListenerConfig, MessageListener};
use openai_brain::OpenAiBrain;
use orchestrator::{
    ConversationEngine, EngineConfig, MessageSender, Router, RouterConfig, Scheduler,
    SchedulerConfig,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::BotConfig;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Resolves once shutdown has been requested.
async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()?;

    // Storage
    let db = Database::connect(&config.sqlite_url).await?;
    db.migrate().await?;

    // Model and tools
    let brain: Arc<dyn Brain> = Arc::new(OpenAiBrain::from_env()?);
    let backends = Backends::from_config(&ToolsConfig::from_env())?;
    let tools = Arc::new(household_registry(db.clone(), &backends));
    info!(brain = brain.name(), tools = ?tools.list_tools(), "Model and tools ready");

    let engine = Arc::new(ConversationEngine::new(
        brain,
        tools,
        db.clone(),
        EngineConfig::from_env(),
    ));

    // Messaging
    let bridge_config = BridgeConfig::from_env();
    info!("Connecting to messaging gateway at {}", bridge_config.base_url);
    let client = BridgeClient::connect(bridge_config).await?;
    let sender: Arc<dyn MessageSender> = Arc::new(BridgeSender::new(client.clone()));

    let router = Arc::new(Router::new(
        engine.clone(),
        sender.clone(),
        RouterConfig::from_env(),
    ));

    let scheduler_config = SchedulerConfig::from_env();
    let broadcast_destination = scheduler_config.broadcast_destination.clone();
    if broadcast_destination.is_none() {
        warn!("BROADCAST_DESTINATION is not set; scheduled prompts and webhooks will not deliver");
    }
    let scheduler = Arc::new(Scheduler::new(
        engine.clone(),
        sender.clone(),
        scheduler_config,
    ));

    if config.webhook_secret.is_none() {
        warn!("WEBHOOK_SECRET is not set; the broadcast webhook rejects every request");
    }
    let state = AppState::new(db.clone(), engine, sender, scheduler.reload_handle())
        .with_webhook_secret(config.webhook_secret.clone())
        .with_broadcast_destination(broadcast_destination);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Admin API
    let listener = tokio::net::TcpListener::bind(config.admin_addr).await?;
    info!(addr = %config.admin_addr, "Admin API listening");
    let admin_shutdown = shutdown_requested(shutdown_rx.clone());
    let admin_task = tokio::spawn(async move {
        axum::serve(listener, admin_web::app(state))
            .with_graceful_shutdown(admin_shutdown)
            .await
    });

    // Scheduler
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_requested(shutdown_rx.clone())));

    // Housekeeping
    let pruner_task = tokio::spawn(maintenance::run_audit_pruner(
        db.clone(),
        config.audit_retention,
        config.audit_max_rows,
        shutdown_requested(shutdown_rx.clone()),
    ));
    let health_monitor = client.start_health_monitor(HEALTH_CHECK_INTERVAL);

    // Inbound messages
    let message_listener = MessageListener::new(client, router, ListenerConfig::from_env());
    let mut listener_task = tokio::spawn(
        message_listener.run_with_shutdown(shutdown_requested(shutdown_rx.clone())),
    );

    info!("Household bot running, press Ctrl+C to stop");

    let mut listener_done = false;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Ctrl+C received, shutting down");
        }
        result = &mut listener_task => {
            listener_done = true;
            match result {
                Ok(Ok(())) => warn!("Message listener stopped"),
                Ok(Err(e)) => error!("Message listener failed: {}", e),
                Err(e) => error!("Message listener task panicked: {}", e),
            }
        }
    }

    let _ = shutdown_tx.send(true);
    health_monitor.abort();

    let drain = async {
        if !listener_done {
            let _ = listener_task.await;
        }
        let _ = scheduler_task.await;
        let _ = pruner_task.await;
        match admin_task.await {
            Ok(Err(e)) => error!("Admin server error: {}", e),
            Err(e) => error!("Admin server task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        warn!("Tasks did not stop within {:?}", SHUTDOWN_GRACE);
    }

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}
