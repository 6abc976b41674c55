//! Messaging webhook - supplier button replies
//!
//! Button ids are namespaced `approve_<panelId>` / `cancel_<panelId>`.
//! The handlers re-validate panel and order state through the same
//! guarded updates as everything else, so a reply to an expired offer
//! just gets the "no longer available" text back.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders::actions;
use crate::utils::{ok, AppError, AppResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct ButtonReply {
    pub phone: String,
    #[serde(rename = "buttonId")]
    pub button_id: String,
}

pub async fn handle(
    State(state): State<ServerState>,
    Json(reply): Json<ButtonReply>,
) -> AppResult<Json<AppResponse<()>>> {
    let result = if let Some(panel_id) = reply.button_id.strip_prefix("approve_") {
        actions::accept_offer(&state.db, panel_id)
            .await
            .map(|_| "Pedido confirmado! Boa produção.")
    } else if let Some(panel_id) = reply.button_id.strip_prefix("cancel_") {
        actions::decline_offer(&state.db, panel_id, None)
            .await
            .map(|_| "Tudo bem, oferta recusada.")
    } else {
        tracing::debug!(button_id = %reply.button_id, "Unrecognized button reply ignored");
        return Ok(ok("Evento ignorado"));
    };

    let supplier_reply = match result {
        Ok(text) => text,
        // Stale replies are routine: expired offer, double tap, raced
        // decision. The supplier still gets an answer.
        Err(AppError::Unavailable(_)) => "Ação não está mais disponível",
        Err(e) => return Err(e),
    };

    if let Err(e) = state.messaging.send_text(&reply.phone, supplier_reply).await {
        tracing::warn!(phone = %reply.phone, error = %e, "Supplier reply failed");
    }
    Ok(ok("Evento processado"))
}
