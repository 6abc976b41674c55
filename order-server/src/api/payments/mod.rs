//! Payment API Module
//!
//! Adding payments to an order, manual confirmation/cancellation and the
//! card authorize-and-capture endpoint used by the local checkout page.

mod handler;

use axum::{routing::post, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}", axum::routing::delete(handler::cancel))
        .route("/{id}/auth-capture", post(handler::auth_capture))
}
