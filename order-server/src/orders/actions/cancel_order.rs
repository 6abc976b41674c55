//! Explicit order cancellation. One transaction cancels the order, its
//! active panel and every still-settling payment; the supplier (when one
//! was engaged) is told afterwards, best-effort.

use shared::models::PanelStatus;

use crate::db::repository::{order, payment, supplier, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::effects::SideEffect;
use crate::orders::status::CANCEL;
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};

pub async fn cancel_order(
    db: &DbService,
    id: &str,
    reason: Option<String>,
) -> AppResult<ActionOutcome> {
    validate_optional_text(&reason, "motivo", MAX_NOTE_LEN)?;
    let reason = reason.unwrap_or_else(|| "pedido cancelado".to_string());

    let mut tx = db.pool.begin().await?;
    if !order::transition(&mut tx, id, CANCEL.to, CANCEL.allowed_from).await? {
        return Err(AppError::stale());
    }

    let panel = supplier_panel::find_active_by_order(&mut tx, id).await?;
    if let Some(panel) = &panel {
        supplier_panel::transition(
            &mut tx,
            &panel.id,
            PanelStatus::Cancelled,
            &[PanelStatus::Waiting, PanelStatus::Confirmed],
            Some(&reason),
        )
        .await?;
    }
    let cancelled_payments = payment::cancel_open_by_order(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(order_id = id, cancelled_payments, "Order cancelled");

    let mut outcome = ActionOutcome::new("Pedido cancelado");
    if let Some(panel) = panel {
        let supplier = supplier::get(&db.pool, &panel.supplier_id).await?;
        outcome = outcome.with_effect(SideEffect::SupplierText {
            phone: supplier.phone,
            message: format!("O pedido que estava com você foi cancelado. Motivo: {reason}."),
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::{
        seed_order, seed_panel, seed_payment, seed_reference,
    };
    use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};

    #[tokio::test]
    async fn cancels_order_panel_and_open_payments() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::ProducingPreparation).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Confirmed).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Pix, PaymentStatus::Active).await;
        seed_payment(&db.pool, "pay2", "o1", PaymentMethod::Money, PaymentStatus::Paid).await;

        let outcome = cancel_order(&db, "o1", None).await.unwrap();

        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        let panel = supplier_panel::get(&db.pool, "pan1").await.unwrap();
        assert_eq!(panel.status, PanelStatus::Cancelled);
        // Settled payments stay PAID; only open ones are cancelled.
        let payments = payment::list_by_order(&db.pool, "o1").await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Cancelled);
        assert_eq!(payments[1].status, PaymentStatus::Paid);
        assert!(matches!(
            outcome.effects.as_slice(),
            [SideEffect::SupplierText { .. }]
        ));
    }

    #[tokio::test]
    async fn delivered_orders_cannot_be_cancelled() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::DeliveringDelivered).await;

        let err = cancel_order(&db, "o1", None).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn cancel_without_panel_sends_no_supplier_message() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;

        let outcome = cancel_order(&db, "o1", Some("cliente desistiu".into()))
            .await
            .unwrap();
        assert!(outcome.effects.is_empty());
    }
}
