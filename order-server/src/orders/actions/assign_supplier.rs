//! Supplier assignment: offer the order to a supplier as a time-boxed
//! panel. The order CAS comes first so two sellers racing to assign
//! cannot both create a panel; eligibility (coverage zip + product) is
//! re-checked inside the same transaction, and freight/cost are
//! snapshotted from the matched rows so later price edits never change
//! an offer already sent.

use serde::Deserialize;
use serde_json::json;

use shared::models::{PanelStatus, SupplierPanel};
use shared::util::{from_millis, new_id, now_millis};

use crate::core::Config;
use crate::db::repository::{contact, order, supplier, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::effects::SideEffect;
use crate::orders::status::ASSIGN_SUPPLIER;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AssignSupplierRequest {
    pub order_id: String,
    pub supplier_id: String,
}

pub async fn assign_supplier(
    db: &DbService,
    config: &Config,
    req: AssignSupplierRequest,
) -> AppResult<(SupplierPanel, ActionOutcome)> {
    let supplier = supplier::get(&db.pool, &req.supplier_id).await?;

    let mut tx = db.pool.begin().await?;
    if !order::transition(
        &mut tx,
        &req.order_id,
        ASSIGN_SUPPLIER.to,
        ASSIGN_SUPPLIER.allowed_from,
    )
    .await?
    {
        return Err(AppError::Unavailable("Operação indisponível".into()));
    }

    let current = order::find_by_id_tx(&mut tx, &req.order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pedido {} não encontrado", req.order_id)))?;

    let coverage = supplier::find_coverage_for_zip(&mut tx, &req.supplier_id, &current.zip)
        .await?
        .ok_or_else(|| AppError::validation("Fornecedor não atende este pedido"))?;
    let pricing = supplier::find_product_pricing(&mut tx, &req.supplier_id, &current.product_id)
        .await?
        .ok_or_else(|| AppError::validation("Fornecedor não atende este pedido"))?;

    let now = now_millis();
    let panel = SupplierPanel {
        id: new_id(),
        order_id: req.order_id.clone(),
        supplier_id: req.supplier_id.clone(),
        status: PanelStatus::Waiting,
        expire_at: now + config.offer_ttl_millis(),
        image_url: None,
        image_approved: false,
        cost: pricing.cost,
        freight: coverage.freight,
        receiver_name: None,
        delivered_at: None,
        cancel_reason: None,
        created_at: now,
        updated_at: now,
    };
    supplier_panel::create(&mut tx, &panel).await?;
    tx.commit().await?;

    tracing::info!(
        order_id = %req.order_id,
        supplier_id = %req.supplier_id,
        panel_id = %panel.id,
        "Supplier offer sent"
    );

    let product = contact::get_product(&db.pool, &current.product_id).await?;
    let offer = format!(
        "Nova produção: {}. Entrega até {} ({}). Custo R$ {:.2} + frete R$ {:.2}. Aceita o pedido?",
        product.name,
        from_millis(current.delivery_until).format("%d/%m/%Y %H:%M"),
        current.delivery_period.label_pt(),
        panel.cost,
        panel.freight,
    );

    let outcome = ActionOutcome::new("Fornecedor acionado")
        .with_effect(SideEffect::Schedule {
            path: "/api/webhooks/orders/expire-panel".into(),
            trigger_at: panel.expire_at,
            data: json!({ "panelId": panel.id }),
        })
        .with_effect(SideEffect::SupplierOffer {
            phone: supplier.phone,
            message: offer,
            panel_id: panel.id.clone(),
        });
    Ok((panel, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::{seed_order, seed_reference};
    use shared::models::OrderStatus;

    fn request() -> AssignSupplierRequest {
        AssignSupplierRequest {
            order_id: "o1".into(),
            supplier_id: "s1".into(),
        }
    }

    #[tokio::test]
    async fn assignment_snapshots_pricing() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;

        let (panel, outcome) = assign_supplier(&db, &Config::for_tests(), request())
            .await
            .unwrap();

        assert_eq!(panel.status, PanelStatus::Waiting);
        assert_eq!(panel.cost, 80.0);
        assert_eq!(panel.freight, 20.0);
        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::PendingWaiting);
        assert!(matches!(
            outcome.effects.as_slice(),
            [SideEffect::Schedule { .. }, SideEffect::SupplierOffer { .. }]
        ));
    }

    #[tokio::test]
    async fn later_price_edits_do_not_change_the_snapshot() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;

        let (panel, _) = assign_supplier(&db, &Config::for_tests(), request())
            .await
            .unwrap();
        sqlx::query("UPDATE supplier_product SET cost = 999.0 WHERE id = 'sp1'")
            .execute(&db.pool)
            .await
            .unwrap();

        let stored = supplier_panel::get(&db.pool, &panel.id).await.unwrap();
        assert_eq!(stored.cost, 80.0);
    }

    #[tokio::test]
    async fn already_assigned_order_is_unavailable() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingWaiting).await;

        let err = assign_supplier(&db, &Config::for_tests(), request())
            .await
            .unwrap_err();
        match err {
            AppError::Unavailable(msg) => assert_eq!(msg, "Operação indisponível"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_coverage_rolls_back_the_order_cas() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o2", OrderStatus::PendingPreparation).await;
        sqlx::query("UPDATE orders SET zip = '09999999' WHERE id = 'o2'")
            .execute(&db.pool)
            .await
            .unwrap();

        let err = assign_supplier(
            &db,
            &Config::for_tests(),
            AssignSupplierRequest {
                order_id: "o2".into(),
                supplier_id: "s1".into(),
            },
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Fornecedor não atende este pedido"),
            other => panic!("unexpected error: {other:?}"),
        }
        // The CAS to PENDING_WAITING rolled back with the panel insert.
        let stored = order::get(&db.pool, "o2").await.unwrap();
        assert_eq!(stored.status, OrderStatus::PendingPreparation);
    }

    #[tokio::test]
    async fn reassignment_after_decline_is_allowed() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingCancelled).await;

        let (panel, _) = assign_supplier(&db, &Config::for_tests(), request())
            .await
            .unwrap();
        assert_eq!(panel.status, PanelStatus::Waiting);
        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::PendingWaiting);
    }
}
