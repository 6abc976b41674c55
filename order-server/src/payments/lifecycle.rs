//! Payment lifecycle
//!
//! Manual confirmation/cancellation by the seller, the card
//! authorize-and-capture call from the local checkout page, and the
//! application of gateway webhook events. Every status move is a guarded
//! update; a miss means the payment already settled (or was cancelled)
//! and the operation degrades to a no-op or a stale-state error.

use sqlx::SqlitePool;

use shared::models::{Payment, PaymentMethod, PaymentStatus};
use shared::util::now_millis;

use crate::db::repository;
use crate::payments::processor::{self, cents_to_amount};
use crate::services::gateway::{
    CreditCardOptions, GatewayAddress, GatewayCustomer, GatewayItem, GatewayOrderRequest,
    GatewayPaymentMethod, PaymentGateway,
};
use crate::utils::{AppError, AppResult};

/// Seller confirms an internally-collected payment.
pub async fn confirm_payment(pool: &SqlitePool, id: &str) -> AppResult<Payment> {
    let payment = repository::payment::get(pool, id).await?;
    if !matches!(
        payment.status,
        PaymentStatus::Active | PaymentStatus::Processing
    ) {
        return Err(AppError::stale());
    }

    // Scoped so the re-read below can take the pool's only connection.
    let applied = {
        let mut conn = pool.acquire().await?;
        repository::payment::mark_paid(&mut conn, id, payment.amount, None, now_millis()).await?
    };
    if !applied {
        return Err(AppError::stale());
    }
    repository::payment::get(pool, id).await.map_err(Into::into)
}

/// Seller cancels a payment that has not settled.
pub async fn cancel_payment(pool: &SqlitePool, id: &str) -> AppResult<()> {
    repository::payment::get(pool, id).await?;

    let mut conn = pool.acquire().await?;
    let applied = repository::payment::transition(
        &mut conn,
        id,
        PaymentStatus::Cancelled,
        &[PaymentStatus::Active, PaymentStatus::Processing],
    )
    .await?;
    if !applied {
        return Err(AppError::stale());
    }
    Ok(())
}

/// Card data posted by the local checkout page.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CardCapture {
    pub card_token: String,
    #[serde(default = "default_installments")]
    pub installments: i32,
}

fn default_installments() -> i32 {
    1
}

/// Charge a CARD_CREDIT payment through the gateway, authorize + capture
/// in one call. Requires the gateway to answer `paid`.
pub async fn auth_capture(
    pool: &SqlitePool,
    gateway: &dyn PaymentGateway,
    id: &str,
    card: CardCapture,
) -> AppResult<Payment> {
    let payment = repository::payment::get(pool, id).await?;
    if payment.method != PaymentMethod::CardCredit {
        return Err(AppError::validation(
            "Apenas pagamentos de cartão de crédito podem ser capturados",
        ));
    }
    if !matches!(
        payment.status,
        PaymentStatus::Active | PaymentStatus::Processing
    ) {
        return Err(AppError::stale());
    }

    let order = repository::order::get(pool, &payment.order_id).await?;
    let contact = repository::contact::get_contact(pool, &order.contact_id).await?;
    let city = repository::contact::get_city(pool, &order.city_id).await?;
    let product = repository::contact::get_product(pool, &order.product_id).await?;

    let document = contact
        .document
        .clone()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            AppError::validation("CPF/CNPJ do contato é obrigatório para pagamento com cartão")
        })?;

    let request = GatewayOrderRequest {
        code: payment.id.clone(),
        customer: GatewayCustomer {
            name: contact.name.clone(),
            document,
            phone: contact.phone.clone(),
        },
        address: GatewayAddress {
            line_1: format!("{}, {} - {}", order.street, order.number, order.neighborhood),
            zip_code: order.zip.clone(),
            city: city.name,
            state: city.state,
        },
        items: vec![GatewayItem {
            description: product.name,
            amount: processor::amount_to_cents(payment.amount)?,
            quantity: 1,
        }],
        payments: vec![GatewayPaymentMethod {
            payment_method: "credit_card".into(),
            boleto: None,
            pix: None,
            credit_card: Some(CreditCardOptions {
                card_token: card.card_token,
                installments: card.installments,
            }),
        }],
    };

    let gw_order = gateway
        .create_order(&request)
        .await
        .map_err(processor::translate_gateway_error)?;
    let charge = gw_order
        .first_charge()
        .ok_or_else(|| AppError::Upstream("Pagamento reprovado".into()))?;
    if charge.status != "paid" {
        return Err(AppError::Upstream("Pagamento reprovado".into()));
    }

    {
        let mut conn = pool.acquire().await?;
        repository::payment::mark_paid(
            &mut conn,
            id,
            payment.amount,
            Some(&charge.id),
            now_millis(),
        )
        .await?;
    }
    repository::payment::get(pool, id).await.map_err(Into::into)
}

/// Apply a gateway `order.paid` event.
///
/// Resolves the payment by gateway order id or local payment id; the
/// PAID guard makes the second delivery of the same event a no-op.
/// Returns the settled payment, or `None` when the event was a duplicate.
pub async fn apply_gateway_paid(
    pool: &SqlitePool,
    code: &str,
    amount_cents: Option<i64>,
    charge_id: Option<&str>,
) -> AppResult<Option<Payment>> {
    let payment = repository::payment::find_by_external_ref(pool, code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pagamento {code} não encontrado")))?;

    // Events without an amount keep the stored one.
    let amount = amount_cents.map(cents_to_amount).unwrap_or(payment.amount);
    let applied = {
        let mut conn = pool.acquire().await?;
        repository::payment::mark_paid(&mut conn, &payment.id, amount, charge_id, now_millis())
            .await?
    };
    if !applied {
        tracing::debug!(payment_id = %payment.id, "Duplicate paid event ignored");
        return Ok(None);
    }
    let payment = repository::payment::get(pool, &payment.id).await?;
    Ok(Some(payment))
}

/// Apply a gateway `order.canceled` event. Always permissible.
pub async fn apply_gateway_canceled(pool: &SqlitePool, code: &str) -> AppResult<Payment> {
    let payment = repository::payment::find_by_external_ref(pool, code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pagamento {code} não encontrado")))?;

    {
        let mut conn = pool.acquire().await?;
        repository::payment::mark_cancelled(&mut conn, &payment.id).await?;
    }
    repository::payment::get(pool, &payment.id)
        .await
        .map_err(Into::into)
}
