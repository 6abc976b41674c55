//! Supplier submits the production-proof photo. The order moves to
//! PRODUCING_CONFIRMATION and a warn-late-photo callback is registered
//! near the delivery deadline, so a forgotten review does not sink the
//! delivery window.

use serde_json::json;

use crate::core::Config;
use crate::db::repository::{order, supplier_panel};
use crate::db::DbService;
use crate::orders::actions::ActionOutcome;
use crate::orders::effects::SideEffect;
use crate::orders::status::SUBMIT_PHOTO;
use crate::utils::validation::{validate_required_text, MAX_URL_LEN};
use crate::utils::{AppError, AppResult};

pub async fn submit_photo(
    db: &DbService,
    config: &Config,
    panel_id: &str,
    image_url: &str,
) -> AppResult<ActionOutcome> {
    validate_required_text(image_url, "imagem", MAX_URL_LEN)?;
    let panel = supplier_panel::get(&db.pool, panel_id).await?;

    let mut tx = db.pool.begin().await?;
    if !supplier_panel::set_image(&mut tx, panel_id, image_url).await? {
        return Err(AppError::stale());
    }
    if !order::transition(
        &mut tx,
        &panel.order_id,
        SUBMIT_PHOTO.to,
        SUBMIT_PHOTO.allowed_from,
    )
    .await?
    {
        return Err(AppError::stale());
    }
    let current = order::find_by_id_tx(&mut tx, &panel.order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pedido {} não encontrado", panel.order_id)))?;
    tx.commit().await?;

    tracing::info!(panel_id, order_id = %panel.order_id, "Production photo submitted");

    let outcome = ActionOutcome::new("Foto enviada").with_effect(SideEffect::Schedule {
        path: "/api/webhooks/orders/warn-late-photo".into(),
        trigger_at: current.delivery_until - config.photo_warn_lead_millis(),
        data: json!({ "orderId": current.id }),
    });
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::{seed_order, seed_panel, seed_reference};
    use shared::models::{OrderStatus, PanelStatus};

    #[tokio::test]
    async fn photo_moves_order_to_confirmation() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::ProducingPreparation).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Confirmed).await;

        let outcome = submit_photo(&db, &Config::for_tests(), "pan1", "http://cdn.test/foto.jpg")
            .await
            .unwrap();

        let panel = supplier_panel::get(&db.pool, "pan1").await.unwrap();
        assert_eq!(panel.image_url.as_deref(), Some("http://cdn.test/foto.jpg"));
        assert!(!panel.image_approved);
        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::ProducingConfirmation);
        assert!(matches!(
            outcome.effects.as_slice(),
            [SideEffect::Schedule { .. }]
        ));
    }

    #[tokio::test]
    async fn resubmission_resets_approval() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::ProducingPreparation).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Confirmed).await;
        sqlx::query(
            "UPDATE supplier_panel SET image_url = 'http://cdn.test/old.jpg', image_approved = 1 \
             WHERE id = 'pan1'",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        submit_photo(&db, &Config::for_tests(), "pan1", "http://cdn.test/new.jpg")
            .await
            .unwrap();

        let panel = supplier_panel::get(&db.pool, "pan1").await.unwrap();
        assert_eq!(panel.image_url.as_deref(), Some("http://cdn.test/new.jpg"));
        assert!(!panel.image_approved);
    }

    #[tokio::test]
    async fn photo_on_waiting_panel_is_stale() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::PendingWaiting).await;
        seed_panel(&db.pool, "pan1", "o1", PanelStatus::Waiting).await;

        let err = submit_photo(&db, &Config::for_tests(), "pan1", "http://cdn.test/foto.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
