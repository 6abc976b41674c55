//! Post-commit side effects
//!
//! Actions return a list of [`SideEffect`] descriptors instead of calling
//! collaborators mid-transaction. The handler commits state first, then
//! hands the list to [`EffectRunner`], which executes each effect
//! independently, logging failures and collecting them into an
//! [`EffectReport`] so the response can name what did not go out.

use std::sync::Arc;

use shared::models::{Contact, Order, Payment};

use crate::services::{MessageButton, Messaging, Notifier, Scheduler};

/// One best-effort task to run after the business transaction commits.
#[derive(Debug)]
pub enum SideEffect {
    /// Rail-appropriate payment notification to the customer.
    NotifyPayment {
        payment: Payment,
        order: Order,
        contact: Contact,
        product_name: String,
    },
    /// Plain customer message, optionally with an attachment.
    CustomerText {
        phone: String,
        message: String,
        file_url: Option<String>,
    },
    /// Plain supplier message.
    SupplierText { phone: String, message: String },
    /// Interactive offer with accept/decline buttons.
    SupplierOffer {
        phone: String,
        message: String,
        panel_id: String,
    },
    /// Register a future callback with the external scheduler.
    Schedule {
        path: String,
        trigger_at: i64,
        data: serde_json::Value,
    },
}

impl SideEffect {
    /// Portuguese label used in the softened partial-success message.
    pub fn label_pt(&self) -> &'static str {
        match self {
            SideEffect::NotifyPayment { .. } | SideEffect::CustomerText { .. } => {
                "notificação ao cliente"
            }
            SideEffect::SupplierText { .. } | SideEffect::SupplierOffer { .. } => {
                "mensagem ao fornecedor"
            }
            SideEffect::Schedule { .. } => "agendamento",
        }
    }
}

/// Outcome of running the post-commit effect list.
#[derive(Debug, Default)]
pub struct EffectReport {
    pub failed: Vec<&'static str>,
}

impl EffectReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Compose the response message: the plain success text, or the
    /// softened variant naming what failed.
    pub fn message(&self, base: &str) -> String {
        if self.is_clean() {
            return base.to_string();
        }
        let mut names = self.failed.clone();
        names.dedup();
        format!("{base}, mas houve falha em: {}", names.join(", "))
    }
}

/// Executes side effects against the real collaborators.
pub struct EffectRunner {
    notifier: Arc<Notifier>,
    messaging: Arc<dyn Messaging>,
    scheduler: Arc<dyn Scheduler>,
}

impl EffectRunner {
    pub fn new(
        notifier: Arc<Notifier>,
        messaging: Arc<dyn Messaging>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            notifier,
            messaging,
            scheduler,
        }
    }

    /// Run every effect in order; each failure is logged and recorded,
    /// never propagated.
    pub async fn run_all(&self, effects: Vec<SideEffect>) -> EffectReport {
        let mut report = EffectReport::default();
        for effect in effects {
            let label = effect.label_pt();
            if let Err(e) = self.run_one(effect).await {
                tracing::warn!(effect = label, error = %e, "Side effect failed");
                report.failed.push(label);
            }
        }
        report
    }

    async fn run_one(&self, effect: SideEffect) -> Result<(), String> {
        match effect {
            SideEffect::NotifyPayment {
                payment,
                order,
                contact,
                product_name,
            } => self
                .notifier
                .notify_payment(&payment, &order, &contact, &product_name)
                .await
                .map_err(|e| e.to_string()),
            SideEffect::CustomerText {
                phone,
                message,
                file_url,
            } => self
                .notifier
                .send_customer(&phone, &message, file_url.as_deref())
                .await
                .map_err(|e| e.to_string()),
            SideEffect::SupplierText { phone, message } => self
                .messaging
                .send_text(&phone, &message)
                .await
                .map_err(|e| e.to_string()),
            SideEffect::SupplierOffer {
                phone,
                message,
                panel_id,
            } => {
                let buttons = [
                    MessageButton {
                        id: format!("approve_{panel_id}"),
                        label: "Aceitar".into(),
                    },
                    MessageButton {
                        id: format!("cancel_{panel_id}"),
                        label: "Recusar".into(),
                    },
                ];
                self.messaging
                    .send_button_list(&phone, &message, &buttons)
                    .await
                    .map_err(|e| e.to_string())
            }
            SideEffect::Schedule {
                path,
                trigger_at,
                data,
            } => self
                .scheduler
                .schedule(trigger_at, &path, data)
                .await
                .map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_returns_base_message() {
        let report = EffectReport::default();
        assert_eq!(report.message("Pedido criado"), "Pedido criado");
    }

    #[test]
    fn failed_report_names_the_effect() {
        let report = EffectReport {
            failed: vec!["notificação ao cliente"],
        };
        assert_eq!(
            report.message("Pedido criado"),
            "Pedido criado, mas houve falha em: notificação ao cliente"
        );
    }

    #[test]
    fn duplicate_labels_collapse() {
        let report = EffectReport {
            failed: vec!["agendamento", "agendamento"],
        };
        assert_eq!(
            report.message("Fornecedor acionado"),
            "Fornecedor acionado, mas houve falha em: agendamento"
        );
    }
}
