//! Webhook Module
//!
//! Inbound callbacks from the three external collaborators:
//!
//! - [`gateway`] - payment events (`order.paid`, `order.canceled`)
//! - [`messaging`] - supplier button replies (accept/decline)
//! - [`scheduled`] - our own deferred callbacks (expiry, deadline warns)
//!
//! Every handler is idempotent: events can arrive twice or out of order
//! and the guarded updates absorb the duplicates.

mod gateway;
mod messaging;
mod scheduled;

use axum::{routing::post, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/webhooks", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/gateway", post(gateway::handle))
        .route("/messaging", post(messaging::handle))
        .route("/orders/expire-panel", post(scheduled::expire_panel))
        .route("/orders/warn-late-photo", post(scheduled::warn_late_photo))
        .route("/orders/warn-late-order", post(scheduled::warn_late_order))
}
