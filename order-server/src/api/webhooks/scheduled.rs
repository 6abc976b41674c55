//! Scheduled callbacks registered by our own actions
//!
//! All three re-check current state before acting: by the time the
//! scheduler fires, the order usually moved on and the callback is a
//! no-op.

use axum::{extract::State, Json};
use serde::Deserialize;

use shared::models::OrderStatus;
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::repository::{order, supplier, supplier_panel};
use crate::orders::actions;
use crate::utils::{ok, AppResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct PanelCallback {
    #[serde(rename = "panelId")]
    pub panel_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderCallback {
    #[serde(rename = "orderId")]
    pub order_id: String,
}

/// Offer deadline reached.
pub async fn expire_panel(
    State(state): State<ServerState>,
    Json(payload): Json<PanelCallback>,
) -> AppResult<Json<AppResponse<()>>> {
    let applied = actions::expire_panel(&state.db, &payload.panel_id).await?;
    Ok(ok(if applied {
        "Oferta expirada"
    } else {
        "Nada a fazer"
    }))
}

/// Delivery deadline approaching with the order still in production.
pub async fn warn_late_photo(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCallback>,
) -> AppResult<Json<AppResponse<()>>> {
    let Some(current) = order::find_by_id(&state.db.pool, &payload.order_id).await? else {
        return Ok(ok("Nada a fazer"));
    };
    if !matches!(
        current.status,
        OrderStatus::ProducingPreparation | OrderStatus::ProducingConfirmation
    ) {
        return Ok(ok("Nada a fazer"));
    }

    warn_supplier(
        &state,
        &current.id,
        "A entrega se aproxima e a produção ainda não foi concluída. Por favor, atualize o pedido.",
    )
    .await;
    Ok(ok("Aviso enviado"))
}

/// Delivery deadline passed with the order still on route.
pub async fn warn_late_order(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCallback>,
) -> AppResult<Json<AppResponse<()>>> {
    let Some(current) = order::find_by_id(&state.db.pool, &payload.order_id).await? else {
        return Ok(ok("Nada a fazer"));
    };
    if current.status != OrderStatus::DeliveringOnRoute
        || now_millis() < current.delivery_until
    {
        return Ok(ok("Nada a fazer"));
    }

    warn_supplier(
        &state,
        &current.id,
        "A entrega do pedido está atrasada. Por favor, confirme a entrega ou avise o ocorrido.",
    )
    .await;
    Ok(ok("Aviso enviado"))
}

/// Best-effort text to the supplier holding the order's active panel.
async fn warn_supplier(state: &ServerState, order_id: &str, message: &str) {
    let result = async {
        let mut conn = state.db.pool.acquire().await?;
        let Some(panel) = supplier_panel::find_active_by_order(&mut conn, order_id).await? else {
            return Ok::<_, crate::utils::AppError>(());
        };
        drop(conn);
        let producer = supplier::get(&state.db.pool, &panel.supplier_id).await?;
        if let Err(e) = state.messaging.send_text(&producer.phone, message).await {
            tracing::warn!(order_id, error = %e, "Supplier warn failed");
        }
        Ok(())
    }
    .await;
    if let Err(e) = result {
        tracing::warn!(order_id, error = %e, "Supplier warn lookup failed");
    }
}
