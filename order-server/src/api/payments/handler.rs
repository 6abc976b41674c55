//! Payment API Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::models::{OrderStatus, Payment};

use crate::core::ServerState;
use crate::db::repository::{contact, order};
use crate::orders::actions::{finish_order, NewPaymentRequest};
use crate::orders::effects::SideEffect;
use crate::payments::{create_payment, lifecycle};
use crate::utils::{ok, ok_with, AppError, AppResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    pub order_id: String,
    #[serde(flatten)]
    pub payment: NewPaymentRequest,
}

/// Add a payment to an existing order. 201 on success.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AddPaymentRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<Payment>>)> {
    let target = order::get(&state.db.pool, &payload.order_id).await?;
    if target.status.is_terminal() {
        return Err(AppError::validation(
            "Pedido finalizado ou cancelado não aceita novos pagamentos",
        ));
    }

    let customer = contact::get_contact(&state.db.pool, &target.contact_id).await?;
    let city = contact::get_city(&state.db.pool, &target.city_id).await?;
    let product = contact::get_product(&state.db.pool, &target.product_id).await?;

    let mut tx = state.db.pool.begin().await?;
    let payment = create_payment(
        &mut tx,
        &state.config,
        state.gateway.as_ref(),
        &target,
        &customer,
        &city,
        &product,
        payload.payment.into_new_payment(),
    )
    .await?;
    tx.commit().await?;

    let report = state
        .effects()
        .run_all(vec![SideEffect::NotifyPayment {
            payment: payment.clone(),
            order: target,
            contact: customer,
            product_name: product.name,
        }])
        .await;
    Ok((
        StatusCode::CREATED,
        ok_with(report.message("Pagamento criado"), payment),
    ))
}

/// Seller confirms an internally-collected payment.
pub async fn confirm(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Payment>>> {
    let payment = lifecycle::confirm_payment(&state.db.pool, &id).await?;
    try_finish(&state, &payment.order_id).await;
    Ok(ok_with("Pagamento confirmado", payment))
}

/// Cancel a payment that has not settled.
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    lifecycle::cancel_payment(&state.db.pool, &id).await?;
    Ok(ok("Pagamento cancelado"))
}

/// Charge a card payment via the gateway (checkout page callback).
pub async fn auth_capture(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<lifecycle::CardCapture>,
) -> AppResult<Json<AppResponse<Payment>>> {
    let payment =
        lifecycle::auth_capture(&state.db.pool, state.gateway.as_ref(), &id, payload).await?;
    try_finish(&state, &payment.order_id).await;
    Ok(ok_with("Pagamento aprovado", payment))
}

/// Settling the last payment of a delivered order finalizes it.
async fn try_finish(state: &ServerState, order_id: &str) {
    let result = async {
        let target = order::get(&state.db.pool, order_id).await?;
        if target.status == OrderStatus::DeliveringDelivered {
            let mut conn = state.db.pool.acquire().await?;
            finish_order(&mut conn, order_id).await?;
        }
        Ok::<_, AppError>(())
    }
    .await;
    if let Err(e) = result {
        tracing::warn!(order_id, error = %e, "Finalization check failed after payment");
    }
}
