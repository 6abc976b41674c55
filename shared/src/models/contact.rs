//! Customer-facing reference entities consumed as foreign data by the
//! core: contacts, cities and products.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Contact {
    pub id: String,
    pub name: String,
    /// Messaging address (WhatsApp number) notifications are sent to.
    pub phone: String,
    /// CPF/CNPJ, required for gateway-backed payments.
    pub document: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Sale price in currency units (BRL).
    pub price: f64,
}
