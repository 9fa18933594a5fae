//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, publisher and relay wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use catalog_auth::Hs256JwtValidator;
use catalog_infra::Settings;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from process settings (used by `main.rs`).
///
/// Must be called from within a tokio runtime: it spawns the publisher relay.
pub async fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let services = AppServices::from_settings(settings).await?;
    Ok(build_app_with(&settings.jwt_secret, services))
}

/// Build the router around already-wired services.
pub fn build_app_with(jwt_secret: &str, services: AppServices) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::log_requests))
}
