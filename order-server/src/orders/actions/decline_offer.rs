//! Supplier declines the offer: panel WAITING → CANCELLED with the given
//! reason and the order back to PENDING_CANCELLED, ready for
//! reassignment.

use shared::models::PanelStatus;

use crate::db::repository::{order, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::status::RELEASE_OFFER;
use crate::utils::{AppError, AppResult};

pub async fn decline_offer(
    db: &DbService,
    panel_id: &str,
    reason: Option<&str>,
) -> AppResult<ActionOutcome> {
    let panel = supplier_panel::get(&db.pool, panel_id).await?;
    let reason = reason.unwrap_or("recusada pelo fornecedor");

    let mut tx = db.pool.begin().await?;
    if !supplier_panel::transition(
        &mut tx,
        panel_id,
        PanelStatus::Cancelled,
        &[PanelStatus::Waiting],
        Some(reason),
    )
    .await?
    {
        return Err(AppError::stale());
    }
    if !order::transition(
        &mut tx,
        &panel.order_id,
        RELEASE_OFFER.to,
        RELEASE_OFFER.allowed_from,
    )
    .await?
    {
        return Err(AppError::stale());
    }
    tx.commit().await?;

    tracing::info!(panel_id, order_id = %panel.order_id, reason, "Offer declined");
    Ok(ActionOutcome::new("Oferta recusada"))
}
