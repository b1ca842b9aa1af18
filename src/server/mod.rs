//! HTTP schema server
//!
//! Publishes the registry as static, immutable JSON documents with
//! browsable directory indexes.

mod config;
mod health;
mod routes;
mod server;

pub use config::ServerConfig;
pub use health::HealthResponse;
pub use routes::{EntryKind, IndexEntry, IMMUTABLE_CACHE_CONTROL};
pub use server::SchemaServer;
