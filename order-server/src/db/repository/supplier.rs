//! Supplier Repository
//!
//! Eligibility queries for assignment: a supplier must cover the order's
//! delivery zip and carry the order's product. Both lookups return the
//! pricing rows so assignment can snapshot freight/cost.

use super::{RepoError, RepoResult};
use shared::models::{CoverageArea, Supplier, SupplierProduct};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Supplier>> {
    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM supplier WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(supplier)
}

pub async fn get(pool: &SqlitePool, id: &str) -> RepoResult<Supplier> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Fornecedor {id} não encontrado")))
}

/// Coverage area of this supplier containing the given zip, if any.
///
/// Zips are zero-padded 8-digit CEPs, so BETWEEN on text matches numeric
/// order.
pub async fn find_coverage_for_zip(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    zip: &str,
) -> RepoResult<Option<CoverageArea>> {
    let area = sqlx::query_as::<_, CoverageArea>(
        "SELECT * FROM supplier_coverage WHERE supplier_id = ?1 \
         AND ?2 BETWEEN zip_start AND zip_end LIMIT 1",
    )
    .bind(supplier_id)
    .bind(zip)
    .fetch_optional(conn)
    .await?;
    Ok(area)
}

/// This supplier's pricing row for the given product, if it produces it.
pub async fn find_product_pricing(
    conn: &mut SqliteConnection,
    supplier_id: &str,
    product_id: &str,
) -> RepoResult<Option<SupplierProduct>> {
    let pricing = sqlx::query_as::<_, SupplierProduct>(
        "SELECT * FROM supplier_product WHERE supplier_id = ? AND product_id = ? LIMIT 1",
    )
    .bind(supplier_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(pricing)
}
