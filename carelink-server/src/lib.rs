//! CareLink HTTP API server
//!
//! Exposes the benefit engine over a bearer-authenticated JSON API:
//! eligibility checks, benefit requests, dependant management, wallet
//! top-ups and loyalty card issuance.

#[macro_use]
pub mod validation;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

// Re-export commonly used types
pub use error::*;
pub use server::{CarelinkServer, ServerConfig};

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: CarelinkServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
