//! Order Repository
//!
//! All lifecycle writes go through [`transition`]: a conditional update on
//! the current status whose affected-row count tells the caller whether the
//! precondition still held. Orders are never deleted.

use super::{RepoError, RepoResult};
use shared::models::{DeliveryPeriod, Order, OrderStatus};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

/// Insert a new order.
pub async fn create(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, status, delivery_period, delivery_until, is_waited, product_id, \
         contact_id, user_id, form_id, street, number, complement, neighborhood, city_id, zip, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )
    .bind(&order.id)
    .bind(order.status)
    .bind(order.delivery_period)
    .bind(order.delivery_until)
    .bind(order.is_waited)
    .bind(&order.product_id)
    .bind(&order.contact_id)
    .bind(&order.user_id)
    .bind(&order.form_id)
    .bind(&order.street)
    .bind(&order.number)
    .bind(&order.complement)
    .bind(&order.neighborhood)
    .bind(&order.city_id)
    .bind(&order.zip)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Transaction-scoped fetch (reads uncommitted writes of the same tx).
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: &str) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn get(pool: &SqlitePool, id: &str) -> RepoResult<Order> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Pedido {id} não encontrado")))
}

/// List orders for the Kanban board, newest first.
pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<Order>> {
    let orders =
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
    Ok(orders)
}

/// Compare-and-swap on order status.
///
/// `UPDATE orders SET status = ? WHERE id = ? AND status IN (allowed)`.
/// Returns `true` when the transition applied; `false` means the order was
/// no longer in an allowed predecessor state (or does not exist) and the
/// caller should report "action no longer available".
pub async fn transition(
    conn: &mut SqliteConnection,
    id: &str,
    to: OrderStatus,
    allowed_from: &[OrderStatus],
) -> RepoResult<bool> {
    let placeholders = vec!["?"; allowed_from.len()].join(", ");
    let sql = format!(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql).bind(to).bind(now_millis()).bind(id);
    for from in allowed_from {
        query = query.bind(from.as_str());
    }
    let result = query.execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Partial update of delivery fields (COALESCE keeps unset columns).
#[derive(Debug, Default)]
pub struct OrderUpdate {
    pub delivery_period: Option<DeliveryPeriod>,
    pub delivery_until: Option<i64>,
    pub is_waited: Option<bool>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city_id: Option<String>,
    pub zip: Option<String>,
}

/// Terminal orders are frozen: the status guard makes a concurrent
/// cancel/finalize surface as zero affected rows instead of a silent edit.
pub async fn update_fields(
    conn: &mut SqliteConnection,
    id: &str,
    data: &OrderUpdate,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET \
         delivery_period = COALESCE(?1, delivery_period), \
         delivery_until  = COALESCE(?2, delivery_until), \
         is_waited       = COALESCE(?3, is_waited), \
         street          = COALESCE(?4, street), \
         number          = COALESCE(?5, number), \
         complement      = COALESCE(?6, complement), \
         neighborhood    = COALESCE(?7, neighborhood), \
         city_id         = COALESCE(?8, city_id), \
         zip             = COALESCE(?9, zip), \
         updated_at      = ?10 \
         WHERE id = ?11 AND status NOT IN ('FINALIZED', 'CANCELLED')",
    )
    .bind(data.delivery_period)
    .bind(data.delivery_until)
    .bind(data.is_waited)
    .bind(&data.street)
    .bind(&data.number)
    .bind(&data.complement)
    .bind(&data.neighborhood)
    .bind(&data.city_id)
    .bind(&data.zip)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
