//! Server state - shared handles for every request handler
//!
//! Holds the config, the database pool and the external collaborators
//! behind their trait objects. `Arc` fields make cloning cheap; handlers
//! receive the whole state via axum's `State` extractor.

use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::orders::effects::EffectRunner;
use crate::services::{
    AttachmentFetcher, HttpMessaging, HttpPaymentGateway, HttpScheduler, Messaging, Notifier,
    PaymentGateway, Scheduler,
};
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub gateway: Arc<dyn PaymentGateway>,
    pub messaging: Arc<dyn Messaging>,
    pub scheduler: Arc<dyn Scheduler>,
    pub notifier: Arc<Notifier>,
}

impl ServerState {
    /// Build the state with the real HTTP collaborators.
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        let gateway = Arc::new(HttpPaymentGateway::new(
            config.gateway_url.clone(),
            config.gateway_api_key.clone(),
        ));
        let messaging: Arc<dyn Messaging> = Arc::new(HttpMessaging::new(
            config.messaging_url.clone(),
            config.messaging_token.clone(),
        ));
        let scheduler = Arc::new(HttpScheduler::new(
            config.scheduler_url.clone(),
            config.callback_base_url.clone(),
        ));
        let notifier = Arc::new(Notifier::new(messaging.clone()));

        Ok(Self {
            config,
            db,
            gateway,
            messaging,
            scheduler,
            notifier,
        })
    }

    /// Build the state around injected collaborators (tests).
    pub fn with_clients(
        config: Config,
        db: DbService,
        gateway: Arc<dyn PaymentGateway>,
        messaging: Arc<dyn Messaging>,
        scheduler: Arc<dyn Scheduler>,
        fetcher: Arc<dyn AttachmentFetcher>,
    ) -> Self {
        let notifier = Arc::new(Notifier::with_fetcher(messaging.clone(), fetcher));
        Self {
            config,
            db,
            gateway,
            messaging,
            scheduler,
            notifier,
        }
    }

    /// Post-commit side-effect runner over this state's collaborators.
    pub fn effects(&self) -> EffectRunner {
        EffectRunner::new(
            self.notifier.clone(),
            self.messaging.clone(),
            self.scheduler.clone(),
        )
    }
}
