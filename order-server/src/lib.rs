//! Pétala Order Hub
//!
//! Order-management backend for a floral-delivery business: order
//! lifecycle state machine, time-boxed supplier offers, multi-rail
//! payments and webhook reconciliation with the payment gateway, the
//! messaging gateway and the external scheduler.

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod payments;
pub mod services;
pub mod utils;

pub use core::{Config, Server, ServerState};
