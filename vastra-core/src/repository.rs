use async_trait::async_trait;
use uuid::Uuid;
use vastra_shared::{Order, OrderStatus, TrackingEvent};

/// Repository trait for order data access.
///
/// The order store is owned by the order-management service; shipping only
/// reads orders and mutates status, courier and tracking number.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Resolve the order a carrier push belongs to (tracking_number == AWB)
    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomic confirmed/processing -> shipped transition.
    ///
    /// Implementations must perform a conditional update (update-where-status-in)
    /// so the transition happens at most once under concurrent calls. Returns
    /// the updated order, or None when no row was in a shippable state.
    async fn mark_shipped(
        &self,
        id: Uuid,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn append_tracking_event(
        &self,
        order_id: Uuid,
        status: &str,
    ) -> Result<TrackingEvent, Box<dyn std::error::Error + Send + Sync>>;

    /// Newest-first event ledger for display
    async fn list_tracking_events(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, Box<dyn std::error::Error + Send + Sync>>;
}
