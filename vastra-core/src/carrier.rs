use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CarrierError;

/// Line item as the carrier wants it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierOrderItem {
    pub name: String,
    pub sku: String,
    pub units: i32,
    pub selling_price_paise: i64,
}

/// Everything the carrier needs to register a shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierOrderRequest {
    pub reference_id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: ParsedAddress,
    pub items: Vec<CarrierOrderItem>,
    pub subtotal_paise: i64,
    pub payment_method: PaymentMethod,
    pub pickup_location: String,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Prepaid,
    Cod,
}

/// What the carrier hands back after registering an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierOrderReceipt {
    pub order_id: i64,
    pub shipment_id: Option<i64>,
    pub awb: Option<String>,
    pub courier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwbAssignment {
    pub awb: String,
    pub courier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceabilityQuery {
    pub pickup_pincode: String,
    pub delivery_pincode: String,
    pub weight_kg: f64,
    pub cod: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceableCourier {
    pub courier_id: i64,
    pub name: String,
    pub rate_paise: i64,
    pub estimated_days: Option<String>,
}

/// Normalized tracking snapshot from the carrier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub awb: String,
    pub current_status: String,
    pub etd: Option<String>,
    pub courier: Option<String>,
    pub scans: Vec<TrackingScan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingScan {
    pub status: String,
    pub location: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupConfirmation {
    pub pickup_token: Option<String>,
    pub scheduled_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupLocation {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub pincode: String,
}

/// Sole point of contact with the external logistics provider.
///
/// Every method authenticates on its own and never mutates local order state.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    async fn create_order(
        &self,
        request: &CarrierOrderRequest,
    ) -> Result<CarrierOrderReceipt, CarrierError>;

    async fn assign_awb(
        &self,
        shipment_id: i64,
        courier_id: Option<i64>,
    ) -> Result<AwbAssignment, CarrierError>;

    async fn check_serviceability(
        &self,
        query: &ServiceabilityQuery,
    ) -> Result<Vec<ServiceableCourier>, CarrierError>;

    async fn track_by_awb(&self, awb: &str) -> Result<TrackingSnapshot, CarrierError>;

    async fn track_by_order_id(
        &self,
        carrier_order_id: i64,
    ) -> Result<TrackingSnapshot, CarrierError>;

    async fn cancel_shipments(&self, awbs: &[String]) -> Result<(), CarrierError>;

    async fn schedule_pickup(
        &self,
        shipment_ids: &[i64],
    ) -> Result<PickupConfirmation, CarrierError>;

    async fn shipping_label(&self, shipment_ids: &[i64]) -> Result<String, CarrierError>;

    async fn invoice(&self, carrier_order_ids: &[i64]) -> Result<String, CarrierError>;

    /// Registered pickup addresses. Provider failures degrade to an empty
    /// list instead of an error.
    async fn pickup_locations(&self) -> Vec<PickupLocation>;
}

/// A shipping address decomposed from free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Turns the free-text address stored on an order into the structured form
/// the carrier API expects.
pub trait AddressParser: Send + Sync {
    fn parse(&self, raw: &str) -> ParsedAddress;
}
