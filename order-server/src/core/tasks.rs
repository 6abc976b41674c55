//! Background tasks
//!
//! The panel expiry sweep: a periodic pass cancelling WAITING offers
//! whose deadline passed. The external scheduler normally fires the
//! expiry webhook on time; the sweep catches registrations that were
//! lost (scheduler down when the offer was sent, callback not
//! delivered). Both paths share the same guarded update, so running
//! twice is harmless.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::supplier_panel;
use crate::orders::actions::expire_panel;
use shared::util::now_millis;

const SWEEP_BATCH: i32 = 50;

/// Spawn the periodic panel expiry sweep.
pub fn spawn_panel_sweep(state: ServerState, shutdown: CancellationToken) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.sweep_interval_secs);
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Panel expiry sweep started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Panel expiry sweep stopped");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            if let Err(e) = sweep_once(&state).await {
                tracing::warn!(error = %e, "Panel expiry sweep pass failed");
            }
        }
    })
}

/// One sweep pass. Returns the number of panels expired.
pub async fn sweep_once(state: &ServerState) -> crate::utils::AppResult<usize> {
    let overdue =
        supplier_panel::find_expired_waiting(&state.db.pool, now_millis(), SWEEP_BATCH).await?;
    let mut expired = 0;
    for panel in overdue {
        match expire_panel(&state.db, &panel.id).await {
            Ok(true) => expired += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(panel_id = %panel.id, error = %e, "Sweep expiry failed"),
        }
    }
    if expired > 0 {
        tracing::info!(expired, "Panel expiry sweep cancelled overdue offers");
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::db::repository::{order, supplier_panel};
    use crate::db::DbService;
    use crate::orders::actions::testutil::{seed_order, seed_panel, seed_reference, StubGateway};
    use crate::services::{
        AttachmentFetcher, MessageButton, Messaging, MessagingError, Scheduler, SchedulerError,
    };
    use crate::utils::AppResult;
    use async_trait::async_trait;
    use shared::models::{OrderStatus, PanelStatus};
    use std::sync::Arc;

    struct NullMessaging;

    #[async_trait]
    impl Messaging for NullMessaging {
        async fn send_text(&self, _: &str, _: &str) -> Result<(), MessagingError> {
            Ok(())
        }
        async fn send_file(&self, _: &str, _: &str, _: &str) -> Result<(), MessagingError> {
            Ok(())
        }
        async fn send_button_list(
            &self,
            _: &str,
            _: &str,
            _: &[MessageButton],
        ) -> Result<(), MessagingError> {
            Ok(())
        }
    }

    struct NullScheduler;

    #[async_trait]
    impl Scheduler for NullScheduler {
        async fn schedule(
            &self,
            _: i64,
            _: &str,
            _: serde_json::Value,
        ) -> Result<(), SchedulerError> {
            Ok(())
        }
    }

    struct NullFetcher;

    #[async_trait]
    impl AttachmentFetcher for NullFetcher {
        async fn fetch(&self, _: &str) -> AppResult<Vec<u8>> {
            Ok(vec![0])
        }
    }

    async fn test_state() -> ServerState {
        let db = DbService::open_in_memory().await.unwrap();
        ServerState::with_clients(
            Config::for_tests(),
            db,
            Arc::new(StubGateway {
                order: crate::orders::actions::testutil::gateway_order("pending"),
            }),
            Arc::new(NullMessaging),
            Arc::new(NullScheduler),
            Arc::new(NullFetcher),
        )
    }

    #[tokio::test]
    async fn sweep_expires_only_overdue_waiting_panels() {
        let state = test_state().await;
        seed_reference(&state.db.pool).await;
        seed_order(&state.db.pool, "o1", OrderStatus::PendingWaiting).await;
        seed_panel(&state.db.pool, "pan1", "o1", PanelStatus::Waiting).await;
        seed_order(&state.db.pool, "o2", OrderStatus::PendingWaiting).await;
        seed_panel(&state.db.pool, "pan2", "o2", PanelStatus::Waiting).await;
        // Only pan1 is overdue.
        sqlx::query("UPDATE supplier_panel SET expire_at = 1 WHERE id = 'pan1'")
            .execute(&state.db.pool)
            .await
            .unwrap();

        let expired = sweep_once(&state).await.unwrap();
        assert_eq!(expired, 1);

        let pan1 = supplier_panel::get(&state.db.pool, "pan1").await.unwrap();
        assert_eq!(pan1.status, PanelStatus::Cancelled);
        assert_eq!(pan1.cancel_reason.as_deref(), Some("expirada"));
        let o1 = order::get(&state.db.pool, "o1").await.unwrap();
        assert_eq!(o1.status, OrderStatus::PendingCancelled);

        let pan2 = supplier_panel::get(&state.db.pool, "pan2").await.unwrap();
        assert_eq!(pan2.status, PanelStatus::Waiting);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let state = test_state().await;
        seed_reference(&state.db.pool).await;
        seed_order(&state.db.pool, "o1", OrderStatus::PendingWaiting).await;
        seed_panel(&state.db.pool, "pan1", "o1", PanelStatus::Waiting).await;
        sqlx::query("UPDATE supplier_panel SET expire_at = 1 WHERE id = 'pan1'")
            .execute(&state.db.pool)
            .await
            .unwrap();

        assert_eq!(sweep_once(&state).await.unwrap(), 1);
        assert_eq!(sweep_once(&state).await.unwrap(), 0);
    }
}
