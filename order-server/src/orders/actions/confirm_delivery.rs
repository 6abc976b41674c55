//! Delivery confirmation: the supplier records who received the order.
//! The same transaction stamps the panel, moves the order to
//! DELIVERING_DELIVERED and tries finalization (applies only when every
//! payment already settled).

use shared::util::now_millis;

use crate::db::repository::{order, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::{finish_order, ActionOutcome};
use crate::orders::status::CONFIRM_DELIVERY;
use crate::utils::validation::{validate_required_text, MAX_NAME_LEN};
use crate::utils::{AppError, AppResult};

pub async fn confirm_delivery(
    db: &DbService,
    panel_id: &str,
    receiver_name: &str,
) -> AppResult<ActionOutcome> {
    validate_required_text(receiver_name, "nome de quem recebeu", MAX_NAME_LEN)?;
    let panel = supplier_panel::get(&db.pool, panel_id).await?;

    let mut tx = db.pool.begin().await?;
    if !supplier_panel::mark_delivered(&mut tx, panel_id, receiver_name, now_millis()).await? {
        return Err(AppError::stale());
    }
    if !order::transition(
        &mut tx,
        &panel.order_id,
        CONFIRM_DELIVERY.to,
        CONFIRM_DELIVERY.allowed_from,
    )
    .await?
    {
        return Err(AppError::stale());
    }
    if let Err(e) = finish_order(&mut tx, &panel.order_id).await {
        tracing::warn!(order_id = %panel.order_id, error = %e, "Finalization check failed");
    }
    tx.commit().await?;

    tracing::info!(panel_id, order_id = %panel.order_id, receiver_name, "Delivery confirmed");
    Ok(ActionOutcome::new("Entrega confirmada"))
}
