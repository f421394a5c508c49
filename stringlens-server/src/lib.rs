// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

pub mod api;
pub mod config;

use anyhow::Result;
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use stringlens_query::StringEngine;
use stringlens_storage::{RecordStore, StringStore};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{health_check, not_found, strings_router, AppState};
use config::{HttpServerConfig, LogFormat, LoggingConfig, ServerConfig};

/// Initialize the global tracing subscriber
pub fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Open the record store described by `config`
pub fn open_store(config: &ServerConfig) -> Result<Arc<dyn RecordStore>> {
    if config.storage.persist {
        let store = StringStore::open(&config.storage.data_dir)?;
        tracing::info!(
            "Loaded {} strings from {:?}",
            store.len(),
            config.storage.data_dir
        );
        Ok(Arc::new(store))
    } else {
        tracing::info!("Using in-memory storage (set STRINGLENS_PERSIST=true to persist)");
        Ok(Arc::new(StringStore::in_memory()))
    }
}

fn cors_layer(server: &HttpServerConfig) -> Result<CorsLayer> {
    if !server.enable_cors {
        return Ok(CorsLayer::new());
    }

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_origins.is_empty() {
        tracing::warn!("CORS: Allowing all origins (development mode). Set cors_origins in production!");
        return Ok(cors.allow_origin(Any));
    }

    let origins = server
        .cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("CORS: Allowing origins: {:?}", server.cors_origins);
    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

/// Build the full application router
pub fn build_router(state: AppState, server: &HttpServerConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/health", get(health_check))
        .merge(strings_router())
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer(server)?)
        .layer(TraceLayer::new_for_http()))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    init_tracing(&config.logging);

    tracing::info!("Starting Stringlens Server");
    tracing::info!("Configuration: {:#?}", config);

    config.validate()?;
    let addr = config.socket_addr()?;

    let store = open_store(&config)?;
    let engine = StringEngine::new(store)?;
    let app = build_router(AppState::new(engine), &config.server)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_in_memory_store() {
        let mut config = ServerConfig::default();
        config.storage.persist = false;
        let store = open_store(&config).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_cors_rejects_invalid_origin() {
        let mut server = HttpServerConfig::default();
        server.cors_origins = vec!["http://ok.example".to_string(), "bad\norigin".to_string()];
        assert!(cors_layer(&server).is_err());
    }
}
