//! Simple Bank server
//!
//! ```text
//! simple_bank [--env dev] [--port 8080] [--memory]
//! ```
//!
//! Loads `config/{env}.yaml`, connects to PostgreSQL (creating the schema if
//! needed) and serves the HTTP API. `--memory` skips the database and keeps
//! everything in process memory.

use std::sync::Arc;

use anyhow::{Context, Result};

use simple_bank::config::AppConfig;
use simple_bank::db::Database;
use simple_bank::gateway::{self, state::AppState};
use simple_bank::ledger::{LedgerStore, MemoryLedgerStore, PgLedgerStore};
use simple_bank::logging::init_logging;
use simple_bank::user_auth::{MemoryUserStore, PgUserStore, UserStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_memory_store() -> bool {
    std::env::args().any(|a| a == "--memory")
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let _log_guard = init_logging(&app_config);
    tracing::info!(env = %env, version = env!("GIT_HASH"), "Starting simple_bank");

    let (ledger, users, db): (Arc<dyn LedgerStore>, Arc<dyn UserStore>, Option<Arc<Database>>) =
        if use_memory_store() {
            tracing::warn!("Running with in-memory stores; nothing survives a restart");
            let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
            let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
            (ledger, users, None)
        } else {
            let url = app_config
                .postgres_url
                .as_deref()
                .context("postgres_url is not configured (set it or DATABASE_URL, or pass --memory)")?;
            let db = Database::connect(url, app_config.postgres_max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.init_schema().await?;

            let ledger: Arc<dyn LedgerStore> = Arc::new(PgLedgerStore::new(db.pool().clone()));
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.pool().clone()));
            (ledger, users, Some(Arc::new(db)))
        };

    let state = Arc::new(AppState::new(ledger, users, &app_config, db));
    gateway::run_server(&app_config.gateway.host, app_config.gateway.port, state).await
}
