//! Order model
//!
//! One purchase/delivery unit moving through the fulfillment pipeline.
//! Orders are never deleted; cancellation is a status.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Linear with branches:
/// `PENDING_PREPARATION → PENDING_WAITING → {PENDING_CANCELLED | PRODUCING_PREPARATION}
/// → PRODUCING_CONFIRMATION → DELIVERING_ON_ROUTE → DELIVERING_DELIVERED → FINALIZED`.
/// `CANCELLED` is reachable from any pre-delivery state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    PendingPreparation,
    PendingWaiting,
    PendingCancelled,
    ProducingPreparation,
    ProducingConfirmation,
    DeliveringOnRoute,
    DeliveringDelivered,
    Finalized,
    Cancelled,
}

impl OrderStatus {
    /// Wire/database representation (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPreparation => "PENDING_PREPARATION",
            OrderStatus::PendingWaiting => "PENDING_WAITING",
            OrderStatus::PendingCancelled => "PENDING_CANCELLED",
            OrderStatus::ProducingPreparation => "PRODUCING_PREPARATION",
            OrderStatus::ProducingConfirmation => "PRODUCING_CONFIRMATION",
            OrderStatus::DeliveringOnRoute => "DELIVERING_ON_ROUTE",
            OrderStatus::DeliveringDelivered => "DELIVERING_DELIVERED",
            OrderStatus::Finalized => "FINALIZED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Finalized | OrderStatus::Cancelled)
    }

    /// Pre-delivery states from which explicit cancellation is allowed.
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self,
            OrderStatus::DeliveringDelivered | OrderStatus::Finalized | OrderStatus::Cancelled
        )
    }
}

/// Delivery window requested by the customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DeliveryPeriod {
    Morning,
    Afternoon,
    Evening,
    Express,
}

impl DeliveryPeriod {
    pub fn label_pt(&self) -> &'static str {
        match self {
            DeliveryPeriod::Morning => "manhã",
            DeliveryPeriod::Afternoon => "tarde",
            DeliveryPeriod::Evening => "noite",
            DeliveryPeriod::Express => "entrega expressa",
        }
    }
}

/// Order entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub delivery_period: DeliveryPeriod,
    /// Delivery deadline (epoch millis).
    pub delivery_until: i64,
    /// "On hold" flag — the recipient asked to be surprised later.
    pub is_waited: bool,
    pub product_id: String,
    pub contact_id: String,
    /// Seller who created the order.
    pub user_id: String,
    /// Originating lead form, when converted from one.
    pub form_id: Option<String>,
    // Delivery address
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city_id: String,
    pub zip: String,
    pub created_at: i64,
    pub updated_at: i64,
}
