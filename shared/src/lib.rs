//! Shared domain types for the Pétala order hub.
//!
//! Holds the status enums, payment rails and record structs used by the
//! server (and by any future client crate). Database derives are gated
//! behind the `db` feature so lightweight consumers stay dependency-free.

pub mod models;
pub mod util;

pub use models::order::{DeliveryPeriod, Order, OrderStatus};
pub use models::payment::{GatewayRail, InternalRail, Payment, PaymentMethod, PaymentRail, PaymentStatus};
pub use models::supplier_panel::{PanelStatus, SupplierPanel};
