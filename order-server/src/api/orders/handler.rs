//! Order API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::models::Order;

use crate::core::ServerState;
use crate::db::repository::order;
use crate::orders::actions;
use crate::utils::{ok, ok_with, AppResponse, AppResult};

/// Create an order with its first payment. 201 on success.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<actions::CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<Order>>)> {
    let (created, outcome) = actions::create_order(
        &state.db,
        &state.config,
        state.gateway.as_ref(),
        payload,
    )
    .await?;
    let report = state.effects().run_all(outcome.effects).await;
    Ok((
        StatusCode::CREATED,
        ok_with(report.message(&outcome.message), created),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

fn default_limit() -> i32 {
    50
}

/// List orders for the board, newest first.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_all(&state.db.pool, query.limit, query.offset).await?;
    Ok(Json(orders))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let found = order::get(&state.db.pool, &id).await?;
    Ok(Json(found))
}

/// Edit delivery details.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<actions::UpdateOrderRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    let outcome = actions::update_order(&state.db, &id, payload).await?;
    let report = state.effects().run_all(outcome.effects).await;
    Ok(ok(report.message(&outcome.message)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Cancel an order. The body is optional.
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> AppResult<Json<AppResponse<()>>> {
    let reason = payload.and_then(|Json(p)| p.reason);
    let outcome = actions::cancel_order(&state.db, &id, reason).await?;
    let report = state.effects().run_all(outcome.effects).await;
    Ok(ok(report.message(&outcome.message)))
}
