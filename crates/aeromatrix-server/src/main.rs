// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! AeroMatrix Server - drone grid HTTP API
//!
//! Storage is PostgreSQL or SQLite depending on the scheme of
//! `AEROMATRIX_DATABASE_URL`. Migrations run on startup.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use aeromatrix_core::HandlerState;
use aeromatrix_core::config::Config;
use aeromatrix_core::persistence::{Persistence, PostgresPersistence, SqlitePersistence};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aeromatrix_core=info".parse()?)
                .add_directive("aeromatrix_server=info".parse()?),
        )
        .init();

    info!("Starting AeroMatrix Server");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        max_matrix_size = config.limits.max_matrix_size,
        db_max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let persistence: Arc<dyn Persistence> = if config.is_sqlite() {
        Arc::new(SqlitePersistence::connect(&config.database_url, config.db_max_connections).await?)
    } else {
        Arc::new(
            PostgresPersistence::connect(&config.database_url, config.db_max_connections).await?,
        )
    };

    if !persistence.health_check_db().await? {
        anyhow::bail!("database health check failed");
    }
    info!("Database ready, migrations applied");

    let state = HandlerState::with_limits(persistence, config.limits);
    let app = aeromatrix_server::router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!(addr = %config.http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down...");
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
