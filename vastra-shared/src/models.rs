use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::pii::Masked;

/// Order status in the fulfillment lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    ReturnRequested,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::ReturnRequested => "return_requested",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "out_for_delivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            "return_requested" => Some(OrderStatus::ReturnRequested),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Only confirmed or processing orders can move to shipped
    pub fn is_shippable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Processing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single source of truth for a customer's purchase.
///
/// Owned by the order-management service; the shipping core mutates only
/// `status`, `courier`, `tracking_number` and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<Masked<String>>,
    pub customer_phone: Option<Masked<String>>,
    pub status: OrderStatus,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_address: String,
    pub total_paise: i64,
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: String, shipping_address: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
            status: OrderStatus::Pending,
            courier: None,
            tracking_number: None,
            shipping_address,
            total_paise: 0,
            currency: "INR".to_string(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item to the order
    pub fn add_item(&mut self, item: OrderItem) {
        self.total_paise += item.price_paise * item.quantity as i64;
        self.items.push(item);
        self.updated_at = Utc::now();
    }

    /// Update order status
    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// An individual clothing item within an order (read-only for shipping)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    pub price_paise: i64,
}

impl OrderItem {
    pub fn new(order_id: Uuid, name: String, quantity: i32, price_paise: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: None,
            name,
            sku: None,
            size: None,
            quantity,
            price_paise,
        }
    }
}

/// Immutable, timestamped status narration attached to an order.
///
/// Append-only; listed newest-first for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn new(order_id: Uuid, status: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            status,
            created_at: Utc::now(),
        }
    }
}
