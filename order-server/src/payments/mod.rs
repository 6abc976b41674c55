//! Payment creation and lifecycle.

pub mod lifecycle;
pub mod processor;

pub use processor::{amount_to_cents, cents_to_amount, create_payment, NewPayment};
