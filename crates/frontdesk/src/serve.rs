// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `frontdesk serve` command implementation.
//!
//! Opens storage, wires the completion gateway and the Telegram operator
//! channel into the session router and update ingestor, then serves the
//! chat API. The operator poll loop runs as a background task.

use std::path::Path;
use std::sync::Arc;

use frontdesk_bridge::Ingestor;
use frontdesk_config::model::FrontdeskConfig;
use frontdesk_core::{CompletionApi, FrontdeskError, OperatorApi};
use frontdesk_gateway::{Gateway, OpenRouterClient};
use frontdesk_router::SessionRouter;
use frontdesk_storage::Database;
use frontdesk_telegram::TelegramApi;
use tracing::info;

use crate::http;

/// Runs the `frontdesk serve` command.
pub async fn run_serve(config: FrontdeskConfig) -> Result<(), FrontdeskError> {
    init_tracing(&config.service.log_level);
    info!(service = config.service.name.as_str(), "starting frontdesk serve");

    if let Some(parent) = Path::new(&config.storage.database_path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| FrontdeskError::Internal(format!("cannot create data directory: {e}")))?;
    }
    let db = Arc::new(Database::open(&config.storage.database_path, config.storage.wal_mode).await?);
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let backend: Arc<dyn CompletionApi> = Arc::new(OpenRouterClient::new(&config.gateway)?);
    let gateway = Gateway::new(backend, config.gateway.models.clone());

    let operator: Arc<dyn OperatorApi> = Arc::new(TelegramApi::new()?);
    let sessions = Arc::new(SessionRouter::new(db.clone(), gateway, operator.clone()));
    let ingestor = Arc::new(Ingestor::new(db.clone(), operator, config.poller.clone()));

    if config.poller.enabled {
        tokio::spawn(ingestor.clone().run());
    } else {
        info!("operator poll loop disabled by configuration");
    }

    let app = http::build_router(http::AppState {
        db,
        sessions,
        ingestor,
    });
    let listener = tokio::net::TcpListener::bind(&config.service.bind_address)
        .await
        .map_err(|e| {
            FrontdeskError::Internal(format!("cannot bind {}: {e}", config.service.bind_address))
        })?;
    info!(address = config.service.bind_address.as_str(), "chat API listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| FrontdeskError::Internal(e.to_string()))?;
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("frontdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
