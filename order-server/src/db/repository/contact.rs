//! Reference-entity lookups: contacts, cities, products.
//!
//! These are plain reads; their CRUD lives outside the core.

use super::{RepoError, RepoResult};
use shared::models::{City, Contact, Product};
use sqlx::SqlitePool;

pub async fn get_contact(pool: &SqlitePool, id: &str) -> RepoResult<Contact> {
    sqlx::query_as::<_, Contact>("SELECT * FROM contact WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Contato {id} não encontrado")))
}

pub async fn get_city(pool: &SqlitePool, id: &str) -> RepoResult<City> {
    sqlx::query_as::<_, City>("SELECT * FROM city WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Cidade {id} não encontrada")))
}

pub async fn get_product(pool: &SqlitePool, id: &str) -> RepoResult<Product> {
    sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Produto {id} não encontrado")))
}
