pub mod orchestrator;
pub mod webhook;

#[cfg(test)]
mod testutil;

pub use orchestrator::{ShipmentOrchestrator, ShipmentOutcome, ShipmentRequest};
pub use webhook::{map_carrier_status, CarrierWebhook, WebhookIngestor, WebhookOutcome};
