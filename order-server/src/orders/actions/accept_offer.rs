//! Supplier accepts the offer: panel WAITING → CONFIRMED and order
//! PENDING_WAITING → PRODUCING_PREPARATION in one transaction. Either
//! CAS missing (expired offer, concurrent decline, cancelled order)
//! aborts both.

use shared::models::PanelStatus;

use crate::db::repository::{order, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::status::ACCEPT_OFFER;
use crate::utils::{AppError, AppResult};

pub async fn accept_offer(db: &DbService, panel_id: &str) -> AppResult<ActionOutcome> {
    let panel = supplier_panel::get(&db.pool, panel_id).await?;

    let mut tx = db.pool.begin().await?;
    if !supplier_panel::transition(
        &mut tx,
        panel_id,
        PanelStatus::Confirmed,
        &[PanelStatus::Waiting],
        None,
    )
    .await?
    {
        return Err(AppError::stale());
    }
    if !order::transition(
        &mut tx,
        &panel.order_id,
        ACCEPT_OFFER.to,
        ACCEPT_OFFER.allowed_from,
    )
    .await?
    {
        return Err(AppError::stale());
    }
    tx.commit().await?;

    tracing::info!(panel_id, order_id = %panel.order_id, "Offer accepted");
    Ok(ActionOutcome::new("Oferta aceita"))
}
