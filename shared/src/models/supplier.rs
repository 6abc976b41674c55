//! Supplier reference data: the shop itself, its coverage areas (zip
//! ranges with freight) and the products it can produce (with cost).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Messaging address (WhatsApp number) offers are sent to.
    pub phone: String,
    pub created_at: i64,
}

/// A zip range a supplier delivers to, with the freight charged for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CoverageArea {
    pub id: String,
    pub supplier_id: String,
    pub zip_start: String,
    pub zip_end: String,
    pub freight: f64,
}

/// A product a supplier can produce, with its cost to the business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupplierProduct {
    pub id: String,
    pub supplier_id: String,
    pub product_id: String,
    pub cost: f64,
}
