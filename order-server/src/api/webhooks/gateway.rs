//! Payment gateway webhook
//!
//! `order.paid` settles the referenced payment (the PAID guard absorbs
//! duplicates), thanks the customer and re-runs finalization when the
//! order was already delivered. `order.canceled` stamps the payment
//! CANCELLED unconditionally. Unknown event types are acknowledged and
//! ignored so the gateway stops retrying them.

use axum::{extract::State, Json};
use serde::Deserialize;

use shared::models::OrderStatus;

use crate::core::ServerState;
use crate::db::repository::{contact, order};
use crate::orders::actions::finish_order;
use crate::orders::effects::SideEffect;
use crate::payments::lifecycle;
use crate::utils::{ok, AppResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: GatewayEventData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayEventData {
    /// Our payment id, echoed back from order creation.
    pub code: String,
    /// Settled amount in cents.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub charges: Vec<EventCharge>,
}

#[derive(Debug, Deserialize)]
pub struct EventCharge {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
}

pub async fn handle(
    State(state): State<ServerState>,
    Json(event): Json<GatewayEvent>,
) -> AppResult<Json<AppResponse<()>>> {
    match event.event_type.as_str() {
        "order.paid" => {
            let charge = event.data.charges.first();
            let amount_cents = charge.and_then(|c| c.amount).or(event.data.amount);
            let charge_id = charge.map(|c| c.id.as_str());

            let Some(payment) = lifecycle::apply_gateway_paid(
                &state.db.pool,
                &event.data.code,
                amount_cents,
                charge_id,
            )
            .await?
            else {
                return Ok(ok("Evento já processado"));
            };

            tracing::info!(payment_id = %payment.id, "Gateway payment settled");

            let paid_order = order::get(&state.db.pool, &payment.order_id).await?;
            let customer = contact::get_contact(&state.db.pool, &paid_order.contact_id).await?;
            let product = contact::get_product(&state.db.pool, &paid_order.product_id).await?;
            state
                .effects()
                .run_all(vec![SideEffect::CustomerText {
                    phone: customer.phone,
                    message: format!(
                        "Olá, {}! Recebemos o pagamento do seu pedido de {}. Obrigado!",
                        customer.name, product.name
                    ),
                    file_url: None,
                }])
                .await;

            if paid_order.status == OrderStatus::DeliveringDelivered {
                let mut conn = state.db.pool.acquire().await?;
                if let Err(e) = finish_order(&mut conn, &paid_order.id).await {
                    tracing::warn!(order_id = %paid_order.id, error = %e, "Finalization check failed");
                }
            }
            Ok(ok("Evento processado"))
        }
        "order.canceled" => {
            let payment =
                lifecycle::apply_gateway_canceled(&state.db.pool, &event.data.code).await?;
            tracing::info!(payment_id = %payment.id, "Gateway payment cancelled");
            Ok(ok("Evento processado"))
        }
        other => {
            tracing::debug!(event_type = other, "Gateway event ignored");
            Ok(ok("Evento ignorado"))
        }
    }
}
