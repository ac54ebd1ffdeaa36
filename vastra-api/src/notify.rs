use async_trait::async_trait;
use serde_json::json;

use vastra_core::error::NotifyError;
use vastra_core::notify::Notifier;
use vastra_shared::Order;
use vastra_store::app_config::MailConfig;

/// Posts "order shipped" messages to the transactional mail relay.
///
/// Only ever invoked from the orchestrator's detached task; a dead relay
/// costs a log line, not a shipment.
pub struct MailNotifier {
    http: reqwest::Client,
    relay_url: String,
    api_key: String,
    from_address: String,
}

impl MailNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            relay_url: config.relay_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn order_shipped(&self, order: &Order) -> Result<(), NotifyError> {
        let Some(email) = order.customer_email.as_ref() else {
            tracing::debug!(order_id = %order.id, "Order has no customer email, skipping notification");
            return Ok(());
        };

        let courier = order.courier.as_deref().unwrap_or("your courier");
        let tracking = order.tracking_number.as_deref().unwrap_or("-");

        let body = json!({
            "from": self.from_address,
            "to": email.as_ref(),
            "subject": "Your order has shipped",
            "text": format!(
                "Good news! Your order {} is on its way via {}. Track it with {}.",
                order.id, courier, tracking
            ),
        });

        let response = self
            .http
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError(format!("Mail relay returned HTTP {}", status)));
        }

        tracing::info!(order_id = %order.id, "Shipped notification dispatched");
        Ok(())
    }
}
