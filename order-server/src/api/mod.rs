//! API routing module
//!
//! - [`health`] - liveness probe
//! - [`orders`] - order CRUD and cancellation
//! - [`payments`] - payment creation and lifecycle
//! - [`supplier_panel`] - supplier offers, photos, delivery
//! - [`webhooks`] - gateway / messaging / scheduler callbacks

pub mod health;
pub mod orders;
pub mod payments;
pub mod supplier_panel;
pub mod webhooks;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Full application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(supplier_panel::router())
        .merge(webhooks::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
