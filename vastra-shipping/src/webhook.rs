use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use vastra_core::repository::OrderRepository;
use vastra_shared::OrderStatus;

/// Asynchronous status push from the carrier. Field names follow the vendor
/// payload; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierWebhook {
    #[serde(default)]
    pub awb: Option<String>,
    #[serde(default, alias = "shipment_status")]
    pub current_status: Option<String>,
    #[serde(default)]
    pub courier_name: Option<String>,
    #[serde(default)]
    pub etd: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied {
        order_id: Uuid,
        status: OrderStatus,
        status_changed: bool,
    },
    /// The AWB matched no local order. Acknowledged, not an error: the
    /// provider retries on anything else.
    UnknownAwb,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook payload carried no AWB")]
    MissingAwb,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Map vendor status text to the internal vocabulary.
///
/// Ordered, case-insensitive substring rules; unrecognized text leaves the
/// status unchanged (the raw text still lands in the tracking ledger).
pub fn map_carrier_status(raw: &str, current: OrderStatus) -> OrderStatus {
    let lowered = raw.to_lowercase();

    if lowered.contains("delivered") {
        OrderStatus::Delivered
    } else if lowered.contains("out for delivery") || lowered.contains("ofd") {
        OrderStatus::OutForDelivery
    } else if lowered.contains("in transit")
        || lowered.contains("shipped")
        || lowered.contains("picked")
    {
        OrderStatus::Shipped
    } else if lowered.contains("rto") || lowered.contains("return") {
        OrderStatus::ReturnRequested
    } else if lowered.contains("cancel") {
        OrderStatus::Cancelled
    } else {
        current
    }
}

/// Stateless handler for carrier pushes: resolves the order by AWB, applies
/// the mapped status when it changed, and always appends the raw vendor text
/// to the tracking ledger (the ledger is a superset of canonical transitions).
pub struct WebhookIngestor {
    orders: Arc<dyn OrderRepository>,
}

impl WebhookIngestor {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn ingest(&self, payload: &CarrierWebhook) -> Result<WebhookOutcome, WebhookError> {
        let awb = payload
            .awb
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingAwb)?;

        let order = self
            .orders
            .find_by_tracking_number(awb)
            .await
            .map_err(|e| WebhookError::Storage(e.to_string()))?;

        let Some(order) = order else {
            info!(awb = %awb, "Webhook for unknown AWB acknowledged");
            return Ok(WebhookOutcome::UnknownAwb);
        };

        let raw_status = payload
            .current_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mapped = raw_status
            .map(|raw| map_carrier_status(raw, order.status))
            .unwrap_or(order.status);

        let status_changed = mapped != order.status;
        if status_changed {
            self.orders
                .update_status(order.id, mapped)
                .await
                .map_err(|e| WebhookError::Storage(e.to_string()))?;
            info!(
                order_id = %order.id,
                from = %order.status,
                to = %mapped,
                "Order status updated from carrier webhook"
            );
        }

        let event_text = raw_status.unwrap_or("Carrier status update");
        self.orders
            .append_tracking_event(order.id, event_text)
            .await
            .map_err(|e| WebhookError::Storage(e.to_string()))?;

        Ok(WebhookOutcome::Applied {
            order_id: order.id,
            status: mapped,
            status_changed,
        })
    }
}
