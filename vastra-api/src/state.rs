use std::sync::Arc;

use vastra_core::carrier::CarrierGateway;
use vastra_core::repository::OrderRepository;
use vastra_shipping::{ShipmentOrchestrator, WebhookIngestor};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderRepository>,
    pub carrier: Arc<dyn CarrierGateway>,
    pub orchestrator: Arc<ShipmentOrchestrator>,
    pub ingestor: Arc<WebhookIngestor>,
    pub auth: AuthConfig,
}
