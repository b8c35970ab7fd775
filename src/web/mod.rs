//! Web API module for DevDigest.
//!
//! This module provides the JSON API the feed UI consumes and the HTTP
//! triggers for ingestion.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_health_router, create_router};
pub use server::WebServer;
