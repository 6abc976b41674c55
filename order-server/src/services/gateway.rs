//! Payment gateway client
//!
//! Builds gateway orders (customer + address + line items + payment
//! method) and reads back the charge data the local Payment row needs.
//! The trait seam lets tests inject a scripted gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gateway call failure.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The gateway answered but refused the charge (non-2xx, or a charge
    /// in an unexpected state).
    #[error("Charge rejected: {0}")]
    Rejected(String),

    /// Transport or decoding failure before any gateway decision.
    #[error("Gateway request failed: {0}")]
    Http(String),
}

impl GatewayError {
    /// Whether the rejection mentions the customer document — surfaced to
    /// the seller as an invalid CPF/CNPJ hint.
    pub fn mentions_document(&self) -> bool {
        match self {
            GatewayError::Rejected(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("cpf") || lower.contains("cnpj") || lower.contains("document")
            }
            GatewayError::Http(_) => false,
        }
    }
}

// ========== Request payload ==========

#[derive(Debug, Clone, Serialize)]
pub struct GatewayCustomer {
    pub name: String,
    pub document: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayAddress {
    pub line_1: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayItem {
    pub description: String,
    /// Amount in cents.
    pub amount: i64,
    pub quantity: i32,
}

/// Requested payment method. Exactly one of the option blocks is set.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayPaymentMethod {
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto: Option<BoletoOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoletoOptions {
    /// Due date, ISO-8601.
    pub due_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PixOptions {
    /// QR validity in seconds.
    pub expires_in: i64,
}

/// Tokenized card charge, authorized and captured in one call.
#[derive(Debug, Clone, Serialize)]
pub struct CreditCardOptions {
    pub card_token: String,
    pub installments: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    /// Our payment id, echoed back as `code` on webhooks.
    pub code: String,
    pub customer: GatewayCustomer,
    pub address: GatewayAddress,
    pub items: Vec<GatewayItem>,
    pub payments: Vec<GatewayPaymentMethod>,
}

// ========== Response payload ==========

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayTransaction {
    #[serde(default)]
    pub pdf: Option<String>,
    /// Boleto digitable line.
    #[serde(default)]
    pub line: Option<String>,
    /// PIX EMV copy-paste payload.
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCharge {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub last_transaction: Option<GatewayTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub charges: Vec<GatewayCharge>,
}

impl GatewayOrder {
    /// First charge of the order — the only one this system creates.
    pub fn first_charge(&self) -> Option<&GatewayCharge> {
        self.charges.first()
    }
}

// ========== Client ==========

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway order with a single charge, synchronously.
    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

/// HTTP implementation (Pagar.me-style `POST /orders`, basic auth).
pub struct HttpPaymentGateway {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/orders", self.base_url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(""))
            .json(req)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("{status}: {body}")));
        }

        resp.json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::Http(format!("Invalid gateway response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_hint_detection() {
        assert!(GatewayError::Rejected("422: invalid CPF number".into()).mentions_document());
        assert!(GatewayError::Rejected("customer document is malformed".into()).mentions_document());
        assert!(!GatewayError::Rejected("card declined".into()).mentions_document());
        assert!(!GatewayError::Http("cpf".into()).mentions_document());
    }
}
