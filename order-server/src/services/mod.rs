//! External collaborators, consumed through trait seams so tests can
//! inject scripted implementations:
//!
//! - [`gateway`] — payment gateway (orders + charges)
//! - [`messaging`] — WhatsApp-style gateway (texts, files, button lists)
//! - [`scheduler`] — external webhook scheduler
//! - [`notifier`] — customer notification dispatcher built on messaging

pub mod gateway;
pub mod messaging;
pub mod notifier;
pub mod scheduler;

pub use gateway::{HttpPaymentGateway, PaymentGateway};
pub use messaging::{HttpMessaging, MessageButton, Messaging, MessagingError};
pub use notifier::{AttachmentFetcher, HttpAttachmentFetcher, Notifier};
pub use scheduler::{HttpScheduler, Scheduler, SchedulerError};
