use async_trait::async_trait;
use vastra_shared::Order;

use crate::error::NotifyError;

/// Outbound customer notifications.
///
/// Dispatch is fire-and-forget: callers spawn it detached and only log
/// failures, so a broken mail relay can never block a state transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_shipped(&self, order: &Order) -> Result<(), NotifyError>;
}
