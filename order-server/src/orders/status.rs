//! Order transition table
//!
//! Each named transition lists its allowed predecessor set. Repositories
//! turn these into `UPDATE ... WHERE status IN (...)` guards; a zero-row
//! update means the precondition no longer holds and the operation answers
//! "action no longer available".

use shared::models::OrderStatus;

/// One guarded transition of the order state machine.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub to: OrderStatus,
    pub allowed_from: &'static [OrderStatus],
}

/// Seller offers the order to a supplier. Re-enterable from
/// PENDING_CANCELLED after a decline/expiry.
pub const ASSIGN_SUPPLIER: Transition = Transition {
    to: OrderStatus::PendingWaiting,
    allowed_from: &[OrderStatus::PendingPreparation, OrderStatus::PendingCancelled],
};

/// Supplier accepted the offer.
pub const ACCEPT_OFFER: Transition = Transition {
    to: OrderStatus::ProducingPreparation,
    allowed_from: &[OrderStatus::PendingWaiting],
};

/// Supplier declined, or the offer expired.
pub const RELEASE_OFFER: Transition = Transition {
    to: OrderStatus::PendingCancelled,
    allowed_from: &[OrderStatus::PendingWaiting],
};

/// Supplier submitted the production-proof photo.
pub const SUBMIT_PHOTO: Transition = Transition {
    to: OrderStatus::ProducingConfirmation,
    allowed_from: &[OrderStatus::ProducingPreparation],
};

/// Seller approved the photo; the order leaves for delivery.
pub const APPROVE_PHOTO: Transition = Transition {
    to: OrderStatus::DeliveringOnRoute,
    allowed_from: &[OrderStatus::ProducingConfirmation],
};

/// Seller rejected the photo; back to production.
pub const REJECT_PHOTO: Transition = Transition {
    to: OrderStatus::ProducingPreparation,
    allowed_from: &[OrderStatus::ProducingConfirmation],
};

/// Supplier handed the order to the receiver.
pub const CONFIRM_DELIVERY: Transition = Transition {
    to: OrderStatus::DeliveringDelivered,
    allowed_from: &[OrderStatus::DeliveringOnRoute],
};

/// Close out a delivered, fully paid order.
pub const FINALIZE: Transition = Transition {
    to: OrderStatus::Finalized,
    allowed_from: &[OrderStatus::DeliveringDelivered],
};

/// Explicit cancellation, allowed from any pre-delivery state.
pub const CANCEL: Transition = Transition {
    to: OrderStatus::Cancelled,
    allowed_from: &[
        OrderStatus::PendingPreparation,
        OrderStatus::PendingWaiting,
        OrderStatus::PendingCancelled,
        OrderStatus::ProducingPreparation,
        OrderStatus::ProducingConfirmation,
        OrderStatus::DeliveringOnRoute,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_set_matches_can_cancel() {
        for status in [
            OrderStatus::PendingPreparation,
            OrderStatus::PendingWaiting,
            OrderStatus::PendingCancelled,
            OrderStatus::ProducingPreparation,
            OrderStatus::ProducingConfirmation,
            OrderStatus::DeliveringOnRoute,
            OrderStatus::DeliveringDelivered,
            OrderStatus::Finalized,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(CANCEL.allowed_from.contains(&status), status.can_cancel());
        }
    }

    #[test]
    fn no_transition_leaves_terminal_states() {
        for t in [
            ASSIGN_SUPPLIER,
            ACCEPT_OFFER,
            RELEASE_OFFER,
            SUBMIT_PHOTO,
            APPROVE_PHOTO,
            REJECT_PHOTO,
            CONFIRM_DELIVERY,
            FINALIZE,
            CANCEL,
        ] {
            assert!(!t.allowed_from.contains(&OrderStatus::Finalized));
            assert!(!t.allowed_from.contains(&OrderStatus::Cancelled));
        }
    }
}
