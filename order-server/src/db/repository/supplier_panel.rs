//! SupplierPanel Repository
//!
//! Panel status moves are guarded like order transitions. The WAITING →
//! CANCELLED path is shared by supplier decline, the expiry webhook and
//! the background sweep, so any of the three can race safely.

use super::{RepoError, RepoResult};
use shared::models::{PanelStatus, SupplierPanel};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn create(conn: &mut SqliteConnection, panel: &SupplierPanel) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO supplier_panel (id, order_id, supplier_id, status, expire_at, image_url, \
         image_approved, cost, freight, receiver_name, delivered_at, cancel_reason, created_at, \
         updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )
    .bind(&panel.id)
    .bind(&panel.order_id)
    .bind(&panel.supplier_id)
    .bind(panel.status)
    .bind(panel.expire_at)
    .bind(&panel.image_url)
    .bind(panel.image_approved)
    .bind(panel.cost)
    .bind(panel.freight)
    .bind(&panel.receiver_name)
    .bind(panel.delivered_at)
    .bind(&panel.cancel_reason)
    .bind(panel.created_at)
    .bind(panel.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<SupplierPanel>> {
    let panel = sqlx::query_as::<_, SupplierPanel>("SELECT * FROM supplier_panel WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(panel)
}

pub async fn get(pool: &SqlitePool, id: &str) -> RepoResult<SupplierPanel> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Painel {id} não encontrado")))
}

/// The order's active offer/assignment, if any.
pub async fn find_active_by_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> RepoResult<Option<SupplierPanel>> {
    let panel = sqlx::query_as::<_, SupplierPanel>(
        "SELECT * FROM supplier_panel WHERE order_id = ? AND status IN ('WAITING', 'CONFIRMED') \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(panel)
}

/// Guarded status move. Returns `false` on a precondition miss.
pub async fn transition(
    conn: &mut SqliteConnection,
    id: &str,
    to: PanelStatus,
    allowed_from: &[PanelStatus],
    cancel_reason: Option<&str>,
) -> RepoResult<bool> {
    let placeholders = vec!["?"; allowed_from.len()].join(", ");
    let sql = format!(
        "UPDATE supplier_panel SET status = ?, cancel_reason = COALESCE(?, cancel_reason), \
         updated_at = ? WHERE id = ? AND status IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql)
        .bind(to)
        .bind(cancel_reason)
        .bind(now_millis())
        .bind(id);
    for from in allowed_from {
        query = query.bind(from.as_str());
    }
    let result = query.execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Record a submitted production photo (resets approval).
pub async fn set_image(conn: &mut SqliteConnection, id: &str, image_url: &str) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE supplier_panel SET image_url = ?, image_approved = 0, updated_at = ? \
         WHERE id = ? AND status = 'CONFIRMED'",
    )
    .bind(image_url)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Approve the submitted photo; requires one to be present.
pub async fn approve_image(conn: &mut SqliteConnection, id: &str) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE supplier_panel SET image_approved = 1, updated_at = ? \
         WHERE id = ? AND status = 'CONFIRMED' AND image_url IS NOT NULL",
    )
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Reject the photo: clear it so the supplier submits a new one.
pub async fn clear_image(conn: &mut SqliteConnection, id: &str) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE supplier_panel SET image_url = NULL, image_approved = 0, updated_at = ? \
         WHERE id = ? AND status = 'CONFIRMED'",
    )
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Stamp delivery data on the confirmed panel.
pub async fn mark_delivered(
    conn: &mut SqliteConnection,
    id: &str,
    receiver_name: &str,
    delivered_at: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE supplier_panel SET receiver_name = ?, delivered_at = ?, updated_at = ? \
         WHERE id = ? AND status = 'CONFIRMED'",
    )
    .bind(receiver_name)
    .bind(delivered_at)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// WAITING panels whose offer deadline has passed (for the safety sweep).
pub async fn find_expired_waiting(
    pool: &SqlitePool,
    now: i64,
    limit: i32,
) -> RepoResult<Vec<SupplierPanel>> {
    let panels = sqlx::query_as::<_, SupplierPanel>(
        "SELECT * FROM supplier_panel WHERE status = 'WAITING' AND expire_at < ? \
         ORDER BY expire_at ASC LIMIT ?",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(panels)
}
