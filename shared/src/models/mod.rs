//! Domain record structs and enums.

pub mod contact;
pub mod order;
pub mod payment;
pub mod supplier;
pub mod supplier_panel;

pub use contact::{City, Contact, Product};
pub use order::{DeliveryPeriod, Order, OrderStatus};
pub use payment::{GatewayRail, InternalRail, Payment, PaymentMethod, PaymentRail, PaymentStatus};
pub use supplier::{CoverageArea, Supplier, SupplierProduct};
pub use supplier_panel::{PanelStatus, SupplierPanel};
