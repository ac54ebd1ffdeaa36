use uuid::Uuid;

/// Failures surfaced by the carrier gateway
#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    #[error("Carrier authentication failed: {0}")]
    Auth(String),

    #[error("Carrier order creation failed: {0}")]
    Order(String),

    #[error("AWB assignment failed: {0}")]
    Awb(String),

    #[error("Carrier call timed out")]
    Timeout,

    #[error("Carrier transport error: {0}")]
    Transport(String),

    #[error("Carrier API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Failures surfaced by the shipment orchestrator
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Cannot ship order in status '{from}'")]
    InvalidStateTransition { from: String },

    #[error("Courier name and tracking number are required for manual shipping")]
    MissingShippingDetails,

    #[error("Carrier integration failed: {0}")]
    CarrierIntegrationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShippingError {
    pub fn storage(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ShippingError::Storage(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Notification dispatch failed: {0}")]
pub struct NotifyError(pub String);
