//! One file per state-machine operation. Every action runs its writes in
//! a single transaction built from guarded updates, then returns an
//! [`ActionOutcome`]: the Portuguese success message plus the side
//! effects the handler runs after commit.

mod accept_offer;
mod assign_supplier;
mod cancel_order;
mod confirm_delivery;
mod create_order;
mod decline_offer;
mod expire_panel;
mod finish_order;
mod review_photo;
mod submit_photo;
mod update_order;

pub use accept_offer::accept_offer;
pub use assign_supplier::{assign_supplier, AssignSupplierRequest};
pub use cancel_order::cancel_order;
pub use confirm_delivery::confirm_delivery;
pub use create_order::{create_order, CreateOrderRequest, NewPaymentRequest};
pub use decline_offer::decline_offer;
pub use expire_panel::expire_panel;
pub use finish_order::finish_order;
pub use review_photo::review_photo;
pub use submit_photo::submit_photo;
pub use update_order::{update_order, UpdateOrderRequest};

use crate::orders::effects::SideEffect;

/// What a committed action hands back to its handler.
#[derive(Debug)]
pub struct ActionOutcome {
    /// Base success message (Portuguese), softened by the effect report.
    pub message: String,
    /// Best-effort work to run after the transaction committed.
    pub effects: Vec<SideEffect>,
}

impl ActionOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: SideEffect) -> Self {
        self.effects.push(effect);
        self
    }
}
