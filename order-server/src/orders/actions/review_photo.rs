//! Seller reviews the production photo. Approval sends the order out for
//! delivery (customer sees the photo, a warn-late-order callback guards
//! the deadline); rejection clears the photo and puts the supplier back
//! to work.

use serde_json::json;

use crate::db::repository::{contact, order, supplier, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::effects::SideEffect;
use crate::orders::status::{APPROVE_PHOTO, REJECT_PHOTO};
use crate::utils::{AppError, AppResult};

pub async fn review_photo(db: &DbService, panel_id: &str, approved: bool) -> AppResult<ActionOutcome> {
    let panel = supplier_panel::get(&db.pool, panel_id).await?;

    if approved {
        let mut tx = db.pool.begin().await?;
        // Also fails when no photo was submitted.
        if !supplier_panel::approve_image(&mut tx, panel_id).await? {
            return Err(AppError::stale());
        }
        if !order::transition(
            &mut tx,
            &panel.order_id,
            APPROVE_PHOTO.to,
            APPROVE_PHOTO.allowed_from,
        )
        .await?
        {
            return Err(AppError::stale());
        }
        let current = order::find_by_id_tx(&mut tx, &panel.order_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Pedido {} não encontrado", panel.order_id))
            })?;
        tx.commit().await?;

        tracing::info!(panel_id, order_id = %panel.order_id, "Photo approved, out for delivery");

        let customer = contact::get_contact(&db.pool, &current.contact_id).await?;
        let product = contact::get_product(&db.pool, &current.product_id).await?;
        let outcome = ActionOutcome::new("Foto aprovada")
            .with_effect(SideEffect::Schedule {
                path: "/api/webhooks/orders/warn-late-order".into(),
                trigger_at: current.delivery_until,
                data: json!({ "orderId": current.id }),
            })
            .with_effect(SideEffect::CustomerText {
                phone: customer.phone,
                message: format!(
                    "Olá, {}! Seu pedido de {} está pronto e saiu para entrega.",
                    customer.name, product.name
                ),
                file_url: panel.image_url.clone(),
            });
        Ok(outcome)
    } else {
        let mut tx = db.pool.begin().await?;
        if !supplier_panel::clear_image(&mut tx, panel_id).await? {
            return Err(AppError::stale());
        }
        if !order::transition(
            &mut tx,
            &panel.order_id,
            REJECT_PHOTO.to,
            REJECT_PHOTO.allowed_from,
        )
        .await?
        {
            return Err(AppError::stale());
        }
        tx.commit().await?;

        tracing::info!(panel_id, order_id = %panel.order_id, "Photo rejected");

        let producer = supplier::get(&db.pool, &panel.supplier_id).await?;
        let outcome = ActionOutcome::new("Foto recusada").with_effect(SideEffect::SupplierText {
            phone: producer.phone,
            message: "A foto da produção foi recusada. Por favor, envie uma nova foto.".into(),
        });
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::{seed_order, seed_panel, seed_reference};
    use shared::models::{OrderStatus, PanelStatus};

    async fn seed_with_photo(db: &DbService) {
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::ProducingConfirmation).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Confirmed).await;
        sqlx::query("UPDATE supplier_panel SET image_url = 'http://cdn.test/foto.jpg' WHERE id = 'pan1'")
            .execute(&db.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approval_sends_the_order_out() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_with_photo(&db).await;

        let outcome = review_photo(&db, "pan1", true)
            .await
            .unwrap();

        let panel = supplier_panel::get(&db.pool, "pan1").await.unwrap();
        assert!(panel.image_approved);
        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::DeliveringOnRoute);
        assert!(matches!(
            outcome.effects.as_slice(),
            [SideEffect::Schedule { .. }, SideEffect::CustomerText { file_url: Some(_), .. }]
        ));
    }

    #[tokio::test]
    async fn rejection_clears_the_photo_and_restarts_production() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_with_photo(&db).await;

        let outcome = review_photo(&db, "pan1", false)
            .await
            .unwrap();

        let panel = supplier_panel::get(&db.pool, "pan1").await.unwrap();
        assert!(panel.image_url.is_none());
        assert!(!panel.image_approved);
        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::ProducingPreparation);
        assert!(matches!(
            outcome.effects.as_slice(),
            [SideEffect::SupplierText { .. }]
        ));
    }

    #[tokio::test]
    async fn approval_without_photo_is_stale() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::ProducingConfirmation).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Confirmed).await;

        let err = review_photo(&db, "pan1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
