//! Payment processor
//!
//! Creates a Payment row inside the caller's transaction. Internal rails
//! get their instructions stamped locally; gateway rails call the payment
//! gateway synchronously and persist the returned charge data. A gateway
//! refusal aborts the whole creation, so no half-created payment survives.

use rust_decimal::prelude::*;
use sqlx::SqliteConnection;

use shared::models::{
    City, Contact, InternalRail, Order, Payment, PaymentMethod, PaymentRail, PaymentStatus,
    Product,
};
use shared::util::{from_millis, new_id, now_millis};

use crate::core::Config;
use crate::db::repository;
use crate::services::gateway::{
    BoletoOptions, GatewayAddress, GatewayCustomer, GatewayError, GatewayItem,
    GatewayOrderRequest, GatewayPaymentMethod, PaymentGateway, PixOptions,
};
use crate::utils::{validation, AppError, AppResult};

/// Default boleto due date when the request does not set one.
const BOLETO_DEFAULT_DUE_MILLIS: i64 = 3 * 24 * 60 * 60 * 1000;

/// PIX QR validity requested from the gateway.
const PIX_EXPIRES_SECS: i64 = 24 * 60 * 60;

/// Payment creation request, already deserialized and order-bound.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub method: PaymentMethod,
    /// ACTIVE normally; PAID when the seller already collected.
    pub status: PaymentStatus,
    pub amount: f64,
    pub boleto_due_at: Option<i64>,
}

/// Convert a BRL amount to integer cents for the gateway wire format.
pub fn amount_to_cents(amount: f64) -> AppResult<i64> {
    Decimal::try_from(amount)
        .ok()
        .map(|d| (d * Decimal::ONE_HUNDRED).round())
        .and_then(|d| d.to_i64())
        .ok_or_else(|| AppError::validation("valor deve ser um número válido"))
}

/// Convert gateway cents back to a BRL amount.
pub fn cents_to_amount(cents: i64) -> f64 {
    (Decimal::from(cents) / Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

/// Create a payment for `order` inside the caller's transaction.
///
/// The order status and the single-open-payment rule are re-checked on
/// the transaction's own connection, so a concurrent cancel or a racing
/// second payment cannot slip past the handler's earlier read.
#[allow(clippy::too_many_arguments)]
pub async fn create_payment(
    conn: &mut SqliteConnection,
    config: &Config,
    gateway: &dyn PaymentGateway,
    order: &Order,
    contact: &Contact,
    city: &City,
    product: &Product,
    new: NewPayment,
) -> AppResult<Payment> {
    validation::validate_amount(new.amount, "valor")?;

    let current = repository::order::find_by_id_tx(conn, &order.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pedido {} não encontrado", order.id)))?;
    if current.status.is_terminal() {
        return Err(AppError::validation(
            "Pedido finalizado ou cancelado não aceita novos pagamentos",
        ));
    }
    // At most one payment may be awaiting settlement per order.
    if new.status == PaymentStatus::Active
        && repository::payment::count_active(conn, &order.id).await? > 0
    {
        return Err(AppError::validation(
            "Pedido já possui um pagamento em aberto",
        ));
    }

    let now = now_millis();
    let id = new_id();
    let mut payment = Payment {
        id: id.clone(),
        order_id: order.id.clone(),
        method: new.method,
        status: new.status,
        amount: new.amount,
        external_id: None,
        url: None,
        text: None,
        boleto_due_at: None,
        paid_at: (new.status == PaymentStatus::Paid).then_some(now),
        refund_amount: None,
        created_at: now,
        updated_at: now,
    };

    if PaymentRail::handled_internally(new.method, new.status) {
        match PaymentRail::from(new.method) {
            PaymentRail::Internal(InternalRail::CardCredit) => {
                payment.url = Some(format!("{}/checkout/{id}", config.checkout_base_url));
            }
            PaymentRail::Internal(InternalRail::PixCnpj) => {
                payment.text = Some(config.company_cnpj.clone());
            }
            // Cash, partnership and already-collected gateway methods
            // carry no instructions.
            _ => {}
        }
    } else {
        let due_at = new
            .boleto_due_at
            .unwrap_or(now + BOLETO_DEFAULT_DUE_MILLIS);
        if new.method == PaymentMethod::Boleto {
            payment.boleto_due_at = Some(due_at);
        }

        let request = build_gateway_request(
            &id, new.method, new.amount, due_at, contact, city, order, product,
        )?;
        let gw_order = gateway
            .create_order(&request)
            .await
            .map_err(translate_gateway_error)?;

        let charge = gw_order
            .first_charge()
            .ok_or_else(|| AppError::Upstream("Pagamento reprovado".into()))?;
        // Boleto and PIX charges must come back awaiting payment.
        if charge.status != "pending" {
            return Err(AppError::Upstream("Pagamento reprovado".into()));
        }

        payment.external_id = Some(gw_order.id.clone());
        if let Some(tx) = &charge.last_transaction {
            match new.method {
                PaymentMethod::Boleto => {
                    payment.url = tx.pdf.clone();
                    payment.text = tx.line.clone();
                }
                PaymentMethod::Pix => {
                    payment.url = tx.qr_code_url.clone();
                    payment.text = tx.qr_code.clone();
                }
                _ => {}
            }
        }
    }

    repository::payment::create(conn, &payment).await?;
    Ok(payment)
}

#[allow(clippy::too_many_arguments)]
fn build_gateway_request(
    payment_id: &str,
    method: PaymentMethod,
    amount: f64,
    boleto_due_at: i64,
    contact: &Contact,
    city: &City,
    order: &Order,
    product: &Product,
) -> AppResult<GatewayOrderRequest> {
    let document = contact
        .document
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            AppError::validation("CPF/CNPJ do contato é obrigatório para este meio de pagamento")
        })?;

    let payment_method = match method {
        PaymentMethod::Boleto => GatewayPaymentMethod {
            payment_method: "boleto".into(),
            boleto: Some(BoletoOptions {
                due_at: from_millis(boleto_due_at).to_rfc3339(),
            }),
            pix: None,
            credit_card: None,
        },
        PaymentMethod::Pix => GatewayPaymentMethod {
            payment_method: "pix".into(),
            boleto: None,
            pix: Some(PixOptions {
                expires_in: PIX_EXPIRES_SECS,
            }),
            credit_card: None,
        },
        other => {
            return Err(AppError::internal(format!(
                "Gateway request for internal method {}",
                other.as_str()
            )))
        }
    };

    Ok(GatewayOrderRequest {
        code: payment_id.to_string(),
        customer: GatewayCustomer {
            name: contact.name.clone(),
            document: document.to_string(),
            phone: contact.phone.clone(),
        },
        address: GatewayAddress {
            line_1: format!("{}, {} - {}", order.street, order.number, order.neighborhood),
            zip_code: order.zip.clone(),
            city: city.name.clone(),
            state: city.state.clone(),
        },
        items: vec![GatewayItem {
            description: product.name.clone(),
            amount: amount_to_cents(amount)?,
            quantity: 1,
        }],
        payments: vec![payment_method],
    })
}

/// Map a gateway failure onto the API error taxonomy. Rejections that
/// mention the customer document become an actionable validation hint.
pub fn translate_gateway_error(err: GatewayError) -> AppError {
    if err.mentions_document() {
        return AppError::validation("Pagamento reprovado: verifique o CPF/CNPJ do contato");
    }
    match err {
        GatewayError::Rejected(msg) => {
            tracing::warn!(error = %msg, "Gateway rejected the charge");
            AppError::Upstream("Pagamento reprovado".into())
        }
        GatewayError::Http(msg) => AppError::internal(format!("Gateway unreachable: {msg}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::orders::actions::testutil::{seed_order, seed_payment, seed_reference, RejectingGateway};
    use shared::models::OrderStatus;

    async fn reference(
        pool: &sqlx::SqlitePool,
    ) -> (Contact, City, Product) {
        let contact = repository::contact::get_contact(pool, "c1").await.unwrap();
        let city = repository::contact::get_city(pool, "ct1").await.unwrap();
        let product = repository::contact::get_product(pool, "p1").await.unwrap();
        (contact, city, product)
    }

    fn money(status: PaymentStatus) -> NewPayment {
        NewPayment {
            method: PaymentMethod::Money,
            status,
            amount: 30.0,
            boleto_due_at: None,
        }
    }

    #[tokio::test]
    async fn second_active_payment_is_rejected() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        let order = seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Boleto, PaymentStatus::Active).await;
        let (contact, city, product) = reference(&db.pool).await;
        let gateway = RejectingGateway("unused".into());

        let mut conn = db.pool.acquire().await.unwrap();
        let err = create_payment(
            &mut conn,
            &Config::for_tests(),
            &gateway,
            &order,
            &contact,
            &city,
            &product,
            money(PaymentStatus::Active),
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Pedido já possui um pagamento em aberto")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn settled_payment_joins_an_open_one() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        let order = seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Boleto, PaymentStatus::Active).await;
        let (contact, city, product) = reference(&db.pool).await;
        let gateway = RejectingGateway("unused".into());

        let mut conn = db.pool.acquire().await.unwrap();
        let payment = create_payment(
            &mut conn,
            &Config::for_tests(),
            &gateway,
            &order,
            &contact,
            &city,
            &product,
            money(PaymentStatus::Paid),
        )
        .await
        .unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn cancelled_order_refuses_payment_creation() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        let order = seed_order(&db.pool, "o1", OrderStatus::Cancelled).await;
        let (contact, city, product) = reference(&db.pool).await;
        let gateway = RejectingGateway("unused".into());

        let mut conn = db.pool.acquire().await.unwrap();
        let err = create_payment(
            &mut conn,
            &Config::for_tests(),
            &gateway,
            &order,
            &contact,
            &city,
            &product,
            money(PaymentStatus::Active),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn cents_conversion_is_exact() {
        assert_eq!(amount_to_cents(150.0).unwrap(), 15000);
        assert_eq!(amount_to_cents(99.99).unwrap(), 9999);
        assert_eq!(amount_to_cents(0.1).unwrap(), 10);
        assert!(amount_to_cents(f64::NAN).is_err());
        assert_eq!(cents_to_amount(15000), 150.0);
        assert_eq!(cents_to_amount(9999), 99.99);
    }

    #[test]
    fn document_rejection_becomes_validation_hint() {
        let err = translate_gateway_error(GatewayError::Rejected("invalid CPF".into()));
        assert!(matches!(err, AppError::Validation(_)));

        let err = translate_gateway_error(GatewayError::Rejected("card declined".into()));
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
