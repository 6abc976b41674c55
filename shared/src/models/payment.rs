//! Payment model
//!
//! One payment instrument tied to one order. The rail split
//! ([`PaymentRail`]) decides whether a payment is settled locally or
//! delegated to the external gateway; matching on it is exhaustive, so a
//! new rail is a compile-time-checked addition.

use serde::{Deserialize, Serialize};

/// Payment instrument as stored and sent over the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Boleto,
    Pix,
    PixCnpj,
    CardCredit,
    Money,
    /// Spelling preserved from the wire format ("PATNERSHIP").
    Patnership,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Boleto => "BOLETO",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::PixCnpj => "PIX_CNPJ",
            PaymentMethod::CardCredit => "CARD_CREDIT",
            PaymentMethod::Money => "MONEY",
            PaymentMethod::Patnership => "PATNERSHIP",
        }
    }

    pub fn label_pt(&self) -> &'static str {
        match self {
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::PixCnpj => "PIX CNPJ",
            PaymentMethod::CardCredit => "cartão de crédito",
            PaymentMethod::Money => "dinheiro",
            PaymentMethod::Patnership => "parceria",
        }
    }
}

/// Payment status lifecycle: ACTIVE → PROCESSING → PAID or → CANCELLED.
/// PAID rows are immutable except for refund bookkeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Active,
    Processing,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Active => "ACTIVE",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Rails settled without the external gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalRail {
    Money,
    Partnership,
    /// PIX paid straight to the company CNPJ key.
    PixCnpj,
    /// Card charged by a human through the local checkout link.
    CardCredit,
}

/// Rails delegated to the external payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRail {
    Boleto,
    Pix,
}

/// Tagged split over payment instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRail {
    Internal(InternalRail),
    Gateway(GatewayRail),
}

impl From<PaymentMethod> for PaymentRail {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Money => PaymentRail::Internal(InternalRail::Money),
            PaymentMethod::Patnership => PaymentRail::Internal(InternalRail::Partnership),
            PaymentMethod::PixCnpj => PaymentRail::Internal(InternalRail::PixCnpj),
            PaymentMethod::CardCredit => PaymentRail::Internal(InternalRail::CardCredit),
            PaymentMethod::Boleto => PaymentRail::Gateway(GatewayRail::Boleto),
            PaymentMethod::Pix => PaymentRail::Gateway(GatewayRail::Pix),
        }
    }
}

impl PaymentRail {
    /// A payment is handled internally when its rail never touches the
    /// gateway, or when the seller already collected it (status PAID).
    pub fn handled_internally(method: PaymentMethod, status: PaymentStatus) -> bool {
        matches!(PaymentRail::from(method), PaymentRail::Internal(_))
            || status == PaymentStatus::Paid
    }
}

/// Payment entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Currency units (BRL), not cents.
    pub amount: f64,
    /// Gateway charge id, when gateway-backed.
    pub external_id: Option<String>,
    /// Payment link: boleto PDF url, pix QR url or local checkout link.
    pub url: Option<String>,
    /// Payment instructions text: boleto digitable line, pix EMV payload
    /// or the company CNPJ for PIX_CNPJ.
    pub text: Option<String>,
    pub boleto_due_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub refund_amount: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Payment {
    pub fn rail(&self) -> PaymentRail {
        PaymentRail::from(self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patnership_spelling_survives_serde() {
        let s = serde_json::to_string(&PaymentMethod::Patnership).unwrap();
        assert_eq!(s, "\"PATNERSHIP\"");
        let back: PaymentMethod = serde_json::from_str("\"PATNERSHIP\"").unwrap();
        assert_eq!(back, PaymentMethod::Patnership);
    }

    #[test]
    fn internal_rail_decision() {
        // Internal rails are always internal.
        for m in [
            PaymentMethod::Money,
            PaymentMethod::Patnership,
            PaymentMethod::PixCnpj,
            PaymentMethod::CardCredit,
        ] {
            assert!(PaymentRail::handled_internally(m, PaymentStatus::Active));
        }
        // Gateway rails only when already paid.
        assert!(!PaymentRail::handled_internally(PaymentMethod::Boleto, PaymentStatus::Active));
        assert!(!PaymentRail::handled_internally(PaymentMethod::Pix, PaymentStatus::Active));
        assert!(PaymentRail::handled_internally(PaymentMethod::Pix, PaymentStatus::Paid));
    }
}
