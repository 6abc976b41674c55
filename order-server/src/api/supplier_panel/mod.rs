//! Supplier Panel API Module
//!
//! Assignment, production-photo submission/review and delivery
//! confirmation. The accept/decline buttons themselves come back through
//! the messaging webhook.

mod handler;

use axum::{
    routing::{post, put},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/supplier-panel", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::assign))
        .route("/{id}/image", put(handler::image))
        .route("/{id}/confirm-delivery", post(handler::confirm_delivery))
}
