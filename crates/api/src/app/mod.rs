//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: injected stores, token keys and the gateway
//! - `resource.rs`: single-route CRUD resources with one guard for all verbs
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error and denial responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod resource;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    routes::router(&services).layer(ServiceBuilder::new().layer(Extension(services)))
}

#[cfg(test)]
mod tests;
