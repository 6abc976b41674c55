//! Payment Repository
//!
//! Payment rows carry the gateway linkage (`external_id`) and the local
//! instructions (`url`/`text`). Status moves through guarded updates; the
//! PAID guard doubles as the webhook idempotency check.

use super::{RepoError, RepoResult};
use shared::models::{Payment, PaymentStatus};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn create(conn: &mut SqliteConnection, payment: &Payment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO payment (id, order_id, method, status, amount, external_id, url, text, \
         boleto_due_at, paid_at, refund_amount, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(&payment.id)
    .bind(&payment.order_id)
    .bind(payment.method)
    .bind(payment.status)
    .bind(payment.amount)
    .bind(&payment.external_id)
    .bind(&payment.url)
    .bind(&payment.text)
    .bind(payment.boleto_due_at)
    .bind(payment.paid_at)
    .bind(payment.refund_amount)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(payment)
}

pub async fn get(pool: &SqlitePool, id: &str) -> RepoResult<Payment> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Pagamento {id} não encontrado")))
}

/// Resolve a gateway webhook reference: direct gateway order code first,
/// then local payment id (woocommerce-origin orders carry ours).
pub async fn find_by_external_ref(pool: &SqlitePool, code: &str) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payment WHERE external_id = ?1 OR id = ?1 LIMIT 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

pub async fn list_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<Payment>> {
    let payments =
        sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE order_id = ? ORDER BY created_at ASC")
            .bind(order_id)
            .fetch_all(pool)
            .await?;
    Ok(payments)
}

/// Payments still expected to settle (not PAID, not CANCELLED).
pub async fn count_outstanding(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payment WHERE order_id = ? AND status NOT IN ('PAID', 'CANCELLED')",
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// ACTIVE payments of an order. Creation keeps this at most one.
pub async fn count_active(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payment WHERE order_id = ? AND status = 'ACTIVE'",
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Guarded status move. Returns `false` on a precondition miss.
pub async fn transition(
    conn: &mut SqliteConnection,
    id: &str,
    to: PaymentStatus,
    allowed_from: &[PaymentStatus],
) -> RepoResult<bool> {
    let placeholders = vec!["?"; allowed_from.len()].join(", ");
    let sql = format!(
        "UPDATE payment SET status = ?, updated_at = ? WHERE id = ? AND status IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql).bind(to).bind(now_millis()).bind(id);
    for from in allowed_from {
        query = query.bind(from.as_str());
    }
    let result = query.execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Stamp a payment PAID with the settled amount and gateway charge id.
///
/// `WHERE status != 'PAID'` is the idempotency guard: a duplicate webhook
/// updates zero rows and triggers no second notification.
pub async fn mark_paid(
    conn: &mut SqliteConnection,
    id: &str,
    amount: f64,
    charge_id: Option<&str>,
    paid_at: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE payment SET status = 'PAID', amount = ?1, \
         external_id = COALESCE(?2, external_id), paid_at = ?3, updated_at = ?4 \
         WHERE id = ?5 AND status != 'PAID'",
    )
    .bind(amount)
    .bind(charge_id)
    .bind(paid_at)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Unconditional cancellation — gateway `order.canceled` events are treated
/// as always permissible.
pub async fn mark_cancelled(conn: &mut SqliteConnection, id: &str) -> RepoResult<()> {
    sqlx::query("UPDATE payment SET status = 'CANCELLED', updated_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Cancel every settling payment of an order (used by order cancellation).
pub async fn cancel_open_by_order(conn: &mut SqliteConnection, order_id: &str) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE payment SET status = 'CANCELLED', updated_at = ? \
         WHERE order_id = ? AND status IN ('ACTIVE', 'PROCESSING')",
    )
    .bind(now_millis())
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
