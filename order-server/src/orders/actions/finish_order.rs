//! Finalization: DELIVERING_DELIVERED → FINALIZED once every
//! non-cancelled payment is PAID. Called after delivery confirmation,
//! after a paid webhook and after edits to a delivered order, so it must
//! be idempotent and quiet about misses.

use sqlx::SqliteConnection;

use crate::db::repository::{order, payment};
use crate::orders::status::FINALIZE;
use crate::utils::AppResult;

/// Returns whether the order was finalized by this call.
pub async fn finish_order(conn: &mut SqliteConnection, order_id: &str) -> AppResult<bool> {
    let outstanding = payment::count_outstanding(conn, order_id).await?;
    if outstanding > 0 {
        tracing::debug!(order_id, outstanding, "Order not finalized, payments outstanding");
        return Ok(false);
    }

    let applied = order::transition(conn, order_id, FINALIZE.to, FINALIZE.allowed_from).await?;
    if applied {
        tracing::info!(order_id, "Order finalized");
    } else {
        tracing::debug!(order_id, "Order not in a finalizable state");
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::orders::actions::testutil::{seed_order, seed_payment, seed_reference};
    use shared::models::{OrderStatus, PaymentMethod, PaymentStatus};

    #[tokio::test]
    async fn finalizes_delivered_fully_paid_order() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::DeliveringDelivered).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Pix, PaymentStatus::Paid).await;
        seed_payment(&db.pool, "pay2", "o1", PaymentMethod::Money, PaymentStatus::Cancelled).await;

        let mut conn = db.pool.acquire().await.unwrap();
        assert!(finish_order(&mut conn, "o1").await.unwrap());
        // A second call finds nothing to do.
        assert!(!finish_order(&mut conn, "o1").await.unwrap());
        drop(conn);

        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::Finalized);
    }

    #[tokio::test]
    async fn outstanding_payment_blocks_finalization() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::DeliveringDelivered).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Boleto, PaymentStatus::Processing)
            .await;

        let mut conn = db.pool.acquire().await.unwrap();
        assert!(!finish_order(&mut conn, "o1").await.unwrap());
        drop(conn);

        let order = order::get(&db.pool, "o1").await.unwrap();
        assert_eq!(order.status, OrderStatus::DeliveringDelivered);
    }

    #[tokio::test]
    async fn undelivered_order_is_not_finalized() {
        let db = DbService::open_in_memory().await.unwrap();
        seed_reference(&db.pool).await;
        seed_order(&db.pool, "o1", OrderStatus::DeliveringOnRoute).await;
        seed_payment(&db.pool, "pay1", "o1", PaymentMethod::Money, PaymentStatus::Paid).await;

        let mut conn = db.pool.acquire().await.unwrap();
        assert!(!finish_order(&mut conn, "o1").await.unwrap());
    }
}
