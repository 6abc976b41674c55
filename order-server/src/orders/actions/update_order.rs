//! Delivery-detail edits. Terminal orders are frozen; editing an already
//! delivered order re-runs the finalization check so a late edit cannot
//! leave a fully paid order stuck in DELIVERING_DELIVERED.

use serde::Deserialize;

use shared::models::{DeliveryPeriod, OrderStatus};

use crate::db::repository::order::{self, OrderUpdate};
use crate::db::DbService;
use crate::orders::actions::{finish_order, ActionOutcome};
use crate::utils::validation::{normalize_zip, validate_optional_text, MAX_ADDRESS_LEN};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub delivery_period: Option<DeliveryPeriod>,
    #[serde(default)]
    pub delivery_until: Option<i64>,
    #[serde(default)]
    pub is_waited: Option<bool>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

pub async fn update_order(
    db: &DbService,
    id: &str,
    req: UpdateOrderRequest,
) -> AppResult<ActionOutcome> {
    let current = order::get(&db.pool, id).await?;
    if current.status.is_terminal() {
        return Err(AppError::validation(
            "Pedido finalizado ou cancelado não pode ser editado",
        ));
    }

    validate_optional_text(&req.street, "rua", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.neighborhood, "bairro", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.complement, "complemento", MAX_ADDRESS_LEN)?;
    let zip = match &req.zip {
        Some(z) => Some(normalize_zip(z)?),
        None => None,
    };

    let update = OrderUpdate {
        delivery_period: req.delivery_period,
        delivery_until: req.delivery_until,
        is_waited: req.is_waited,
        street: req.street,
        number: req.number,
        complement: req.complement,
        neighborhood: req.neighborhood,
        city_id: req.city_id,
        zip,
    };

    let mut tx = db.pool.begin().await?;
    if !order::update_fields(&mut tx, id, &update).await? {
        // Lost the race against a concurrent cancel/finalize.
        return Err(AppError::validation(
            "Pedido finalizado ou cancelado não pode ser editado",
        ));
    }
    if current.status == OrderStatus::DeliveringDelivered {
        if let Err(e) = finish_order(&mut tx, id).await {
            tracing::warn!(order_id = id, error = %e, "Finalization check failed after edit");
        }
    }
    tx.commit().await?;

    Ok(ActionOutcome::new("Pedido atualizado"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::{seed_order, seed_payment, seed_reference};
    use shared::models::{PaymentMethod, PaymentStatus};

    #[tokio::test]
    async fn updates_only_the_given_fields() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        let seeded = seed_order(&db.pool, "o1", OrderStatus::PendingPreparation).await;

        let req = UpdateOrderRequest {
            is_waited: Some(true),
            zip: Some("04001-000".into()),
            ..Default::default()
        };
        update_order(&db, "o1", req).await.unwrap();

        let updated = order::get(&db.pool, "o1").await.unwrap();
        assert!(updated.is_waited);
        assert_eq!(updated.zip, "04001000");
        assert_eq!(updated.street, seeded.street);
    }

    #[tokio::test]
    async fn terminal_orders_are_frozen() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::Cancelled).await;

        let err = update_order(&db, "o1", UpdateOrderRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn frozen_orders_match_zero_rows_on_update() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::Finalized).await;

        let update = OrderUpdate {
            is_waited: Some(true),
            ..Default::default()
        };
        let mut conn = db.pool.acquire().await.unwrap();
        let applied = order::update_fields(&mut conn, "o1", &update).await.unwrap();
        assert!(!applied);

        drop(conn);
        let stored = order::get(&db.pool, "o1").await.unwrap();
        assert!(!stored.is_waited);
    }

    #[tokio::test]
    async fn editing_a_delivered_paid_order_finalizes_it() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::DeliveringDelivered).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Money, PaymentStatus::Paid).await;

        update_order(&db, "o1", UpdateOrderRequest::default())
            .await
            .unwrap();

        let updated = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(updated.status, OrderStatus::Finalized);
    }
}
