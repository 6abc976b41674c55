//! Supplier Panel API Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use shared::models::SupplierPanel;

use crate::core::ServerState;
use crate::orders::actions;
use crate::utils::{ok, ok_with, AppError, AppResponse, AppResult};

/// Offer an order to a supplier. 201 on success.
pub async fn assign(
    State(state): State<ServerState>,
    Json(payload): Json<actions::AssignSupplierRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<SupplierPanel>>)> {
    let (panel, outcome) = actions::assign_supplier(&state.db, &state.config, payload).await?;
    let report = state.effects().run_all(outcome.effects).await;
    Ok((
        StatusCode::CREATED,
        ok_with(report.message(&outcome.message), panel),
    ))
}

/// Photo submission or review, told apart by the body:
/// `{"image_url": ...}` submits, `{"approved": true|false}` reviews.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
}

pub async fn image(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ImageRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    let outcome = match (payload.image_url, payload.approved) {
        (Some(url), None) => actions::submit_photo(&state.db, &state.config, &id, &url).await?,
        (None, Some(approved)) => actions::review_photo(&state.db, &id, approved).await?,
        _ => {
            return Err(AppError::validation(
                "Informe image_url (envio) ou approved (avaliação), nunca ambos",
            ))
        }
    };
    let report = state.effects().run_all(outcome.effects).await;
    Ok(ok(report.message(&outcome.message)))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeliveryRequest {
    pub receiver_name: String,
}

pub async fn confirm_delivery(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmDeliveryRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    let outcome = actions::confirm_delivery(&state.db, &id, &payload.receiver_name).await?;
    let report = state.effects().run_all(outcome.effects).await;
    Ok(ok(report.message(&outcome.message)))
}
