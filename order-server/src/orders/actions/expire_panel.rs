//! Offer expiry. Shares the WAITING → CANCELLED path with decline, but is
//! a silent no-op when the panel already moved (the supplier accepted, or
//! the sweep and the scheduled callback raced). Both the scheduler
//! webhook and the periodic sweep call this.

use shared::models::PanelStatus;

use crate::db::repository::{order, supplier_panel};
use crate::db::DbService;
use crate::orders::status::RELEASE_OFFER;
use crate::utils::AppResult;

/// Returns whether the expiry applied.
pub async fn expire_panel(db: &DbService, panel_id: &str) -> AppResult<bool> {
    let Some(panel) = supplier_panel::find_by_id(&db.pool, panel_id).await? else {
        tracing::debug!(panel_id, "Expiry for unknown panel ignored");
        return Ok(false);
    };

    let mut tx = db.pool.begin().await?;
    if !supplier_panel::transition(
        &mut tx,
        panel_id,
        PanelStatus::Cancelled,
        &[PanelStatus::Waiting],
        Some("expirada"),
    )
    .await?
    {
        tracing::debug!(panel_id, "Panel no longer waiting, expiry skipped");
        return Ok(false);
    }
    if !order::transition(
        &mut tx,
        &panel.order_id,
        RELEASE_OFFER.to,
        RELEASE_OFFER.allowed_from,
    )
    .await?
    {
        // Panel WAITING with the order elsewhere should not happen; keep
        // both untouched and let the next sweep retry.
        tracing::warn!(panel_id, order_id = %panel.order_id, "Order CAS missed during expiry");
        return Ok(false);
    }
    tx.commit().await?;

    tracing::info!(panel_id, order_id = %panel.order_id, "Offer expired");
    Ok(true)
}
