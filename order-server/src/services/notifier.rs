//! Customer notification dispatcher
//!
//! Sends exactly one outbound notification appropriate to the payment
//! rail. Callers run this after the business transaction commits; a
//! failure here is degraded to a softened success message, never a
//! rollback.

use std::sync::Arc;

use async_trait::async_trait;

use shared::models::{Contact, GatewayRail, Order, Payment, PaymentRail, PaymentStatus};
use shared::util::from_millis;

use crate::services::messaging::Messaging;
use crate::utils::{AppError, AppResult};

/// Downloads an attachment so its existence is verified before the
/// customer is pointed at it.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>>;
}

pub struct HttpAttachmentFetcher {
    http: reqwest::Client,
}

impl HttpAttachmentFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpAttachmentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentFetcher for HttpAttachmentFetcher {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Attachment fetch failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| AppError::internal(format!("Attachment read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

pub struct Notifier {
    messaging: Arc<dyn Messaging>,
    fetcher: Arc<dyn AttachmentFetcher>,
}

impl Notifier {
    pub fn new(messaging: Arc<dyn Messaging>) -> Self {
        Self::with_fetcher(messaging, Arc::new(HttpAttachmentFetcher::new()))
    }

    pub fn with_fetcher(
        messaging: Arc<dyn Messaging>,
        fetcher: Arc<dyn AttachmentFetcher>,
    ) -> Self {
        Self { messaging, fetcher }
    }

    /// Send the payment notification for a freshly created or confirmed
    /// payment.
    pub async fn notify_payment(
        &self,
        payment: &Payment,
        order: &Order,
        contact: &Contact,
        product_name: &str,
    ) -> AppResult<()> {
        let deadline = deadline_line(order);

        // Internally-handled payments (and anything already settled) get a
        // single formatted message with the local instructions.
        if matches!(payment.rail(), PaymentRail::Internal(_))
            || payment.status == PaymentStatus::Paid
        {
            let instructions = internal_instructions(payment);
            let message = format!(
                "Olá, {}! Seu pedido de {product_name} foi registrado.{instructions}\n{deadline}",
                contact.name
            );
            self.messaging
                .send_text(&contact.phone, &message)
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            return Ok(());
        }

        match payment.rail() {
            PaymentRail::Gateway(GatewayRail::Boleto) => {
                let pdf_url = payment.url.as_deref().ok_or_else(|| {
                    malformed(payment, "boleto payment without a PDF url")
                })?;
                // The attachment must exist before we point the customer at it.
                let bytes = self.fetcher.fetch(pdf_url).await?;
                if bytes.is_empty() {
                    return Err(AppError::internal("Boleto PDF is empty"));
                }

                let line = payment
                    .text
                    .as_deref()
                    .map(|l| format!("\nLinha digitável: {l}"))
                    .unwrap_or_default();
                let message = format!(
                    "Olá, {}! Segue o boleto do seu pedido de {product_name}.{line}\n{deadline}",
                    contact.name
                );
                self.messaging
                    .send_file(&contact.phone, &message, pdf_url)
                    .await
                    .map_err(|e| AppError::internal(e.to_string()))?;
                Ok(())
            }
            PaymentRail::Gateway(GatewayRail::Pix) => {
                let qr_payload = payment.text.as_deref().ok_or_else(|| {
                    malformed(payment, "pix payment without a QR payload")
                })?;
                let message = format!(
                    "Olá, {}! Pague seu pedido de {product_name} via PIX copia e cola abaixo.\n{deadline}",
                    contact.name
                );
                self.messaging
                    .send_text(&contact.phone, &message)
                    .await
                    .map_err(|e| AppError::internal(e.to_string()))?;
                // The EMV payload goes alone so it can be long-pressed and copied.
                self.messaging
                    .send_text(&contact.phone, qr_payload)
                    .await
                    .map_err(|e| AppError::internal(e.to_string()))?;
                Ok(())
            }
            PaymentRail::Internal(_) => unreachable!("handled above"),
        }
    }

    /// Free-form customer message, optionally with an attachment.
    pub async fn send_customer(
        &self,
        phone: &str,
        message: &str,
        file_url: Option<&str>,
    ) -> AppResult<()> {
        let result = match file_url {
            Some(url) => self.messaging.send_file(phone, message, url).await,
            None => self.messaging.send_text(phone, message).await,
        };
        result.map_err(|e| AppError::internal(e.to_string()))
    }
}

fn malformed(payment: &Payment, what: &str) -> AppError {
    tracing::error!(
        payment = ?payment,
        "Malformed payment reached the notifier: {what}"
    );
    AppError::internal(format!("Malformed payment: {what}"))
}

fn internal_instructions(payment: &Payment) -> String {
    if let Some(url) = &payment.url {
        return format!("\nPague pelo link: {url}");
    }
    if let Some(text) = &payment.text {
        return format!("\nPague via PIX para o CNPJ {text}");
    }
    // Cash and partnership carry no instructions.
    String::new()
}

fn deadline_line(order: &Order) -> String {
    format!(
        "Entrega até {} ({}).",
        from_millis(order.delivery_until).format("%d/%m/%Y %H:%M"),
        order.delivery_period.label_pt()
    )
}
