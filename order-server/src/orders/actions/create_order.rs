//! Order creation: one transaction inserting the order (always
//! PENDING_PREPARATION) and its first payment. A gateway refusal rolls
//! the whole thing back, so no order exists without a payment.

use serde::Deserialize;

use shared::models::{DeliveryPeriod, Order, OrderStatus, PaymentMethod, PaymentStatus};
use shared::util::{new_id, now_millis};

use crate::core::Config;
use crate::db::repository::{contact, order};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::effects::SideEffect;
use crate::payments::{create_payment, NewPayment};
use crate::services::gateway::PaymentGateway;
use crate::utils::validation::{
    normalize_zip, validate_optional_text, validate_required_text, MAX_ADDRESS_LEN,
    MAX_SHORT_TEXT_LEN,
};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct NewPaymentRequest {
    pub method: PaymentMethod,
    pub amount: f64,
    /// The seller already collected this payment (cash in hand etc.).
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub boleto_due_at: Option<i64>,
}

impl NewPaymentRequest {
    pub fn into_new_payment(self) -> NewPayment {
        NewPayment {
            method: self.method,
            status: if self.paid {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Active
            },
            amount: self.amount,
            boleto_due_at: self.boleto_due_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub contact_id: String,
    pub product_id: String,
    pub user_id: String,
    #[serde(default)]
    pub form_id: Option<String>,
    pub delivery_period: DeliveryPeriod,
    pub delivery_until: i64,
    #[serde(default)]
    pub is_waited: bool,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city_id: String,
    pub zip: String,
    pub payment: NewPaymentRequest,
}

pub async fn create_order(
    db: &DbService,
    config: &Config,
    gateway: &dyn PaymentGateway,
    req: CreateOrderRequest,
) -> AppResult<(Order, ActionOutcome)> {
    validate_required_text(&req.street, "rua", MAX_ADDRESS_LEN)?;
    validate_required_text(&req.number, "número", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&req.neighborhood, "bairro", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.complement, "complemento", MAX_ADDRESS_LEN)?;
    let zip = normalize_zip(&req.zip)?;

    let contact = contact::get_contact(&db.pool, &req.contact_id).await?;
    let city = contact::get_city(&db.pool, &req.city_id).await?;
    let product = contact::get_product(&db.pool, &req.product_id).await?;

    let now = now_millis();
    let new_order = Order {
        id: new_id(),
        status: OrderStatus::PendingPreparation,
        delivery_period: req.delivery_period,
        delivery_until: req.delivery_until,
        is_waited: req.is_waited,
        product_id: req.product_id,
        contact_id: req.contact_id,
        user_id: req.user_id,
        form_id: req.form_id,
        street: req.street,
        number: req.number,
        complement: req.complement,
        neighborhood: req.neighborhood,
        city_id: req.city_id,
        zip,
        created_at: now,
        updated_at: now,
    };

    let mut tx = db.pool.begin().await?;
    order::create(&mut tx, &new_order).await?;
    let payment = create_payment(
        &mut tx,
        config,
        gateway,
        &new_order,
        &contact,
        &city,
        &product,
        req.payment.into_new_payment(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(order_id = %new_order.id, method = payment.method.as_str(), "Order created");

    let outcome = ActionOutcome::new("Pedido criado").with_effect(SideEffect::NotifyPayment {
        payment,
        order: new_order.clone(),
        contact,
        product_name: product.name,
    });
    Ok((new_order, outcome))
}
