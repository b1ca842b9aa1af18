//! # Schema Server
//!
//! Serves the schema registry over HTTP.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::ServerConfig;
use super::health::health_routes;
use super::routes::{not_found_handler, schema_routes};
use crate::observability::{log_event, Event};
use crate::schema::SchemaRegistry;

/// HTTP server for published schemas
pub struct SchemaServer {
    config: ServerConfig,
    router: Router,
}

impl SchemaServer {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, ServerConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: ServerConfig) -> Self {
        let router = Self::build_router(registry, &config);
        Self { config, router }
    }

    /// Build the router with health and schema endpoints
    pub fn build_router(registry: Arc<SchemaRegistry>, config: &ServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(schema_routes(registry))
            .fallback(not_found_handler)
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process stops
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event(Event::Serving, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
