pub mod models;
pub mod pii;

pub use models::{Order, OrderItem, OrderStatus, TrackingEvent};
pub use pii::Masked;
