//! SupplierPanel model
//!
//! A time-boxed offer of one order to one supplier. Only one panel may be
//! WAITING or CONFIRMED per order at a time; the owning order's status
//! guard enforces this.

use serde::{Deserialize, Serialize};

/// Panel offer status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PanelStatus {
    Waiting,
    Confirmed,
    Cancelled,
}

impl PanelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelStatus::Waiting => "WAITING",
            PanelStatus::Confirmed => "CONFIRMED",
            PanelStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Supplier panel entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupplierPanel {
    pub id: String,
    pub order_id: String,
    pub supplier_id: String,
    pub status: PanelStatus,
    /// Offer deadline (epoch millis). After this the offer auto-expires.
    pub expire_at: i64,
    /// Production-proof photo submitted by the supplier.
    pub image_url: Option<String>,
    pub image_approved: bool,
    /// Production cost snapshotted from supplier pricing at assignment time.
    pub cost: f64,
    /// Freight snapshotted from the matched coverage area at assignment time.
    pub freight: f64,
    pub receiver_name: Option<String>,
    pub delivered_at: Option<i64>,
    pub cancel_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
