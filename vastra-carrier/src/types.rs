//! Wire types for the Shiprocket external API. Responses are deserialized
//! leniently: the provider omits or nulls fields depending on account state,
//! so everything optional defaults instead of failing the whole call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdhocOrderRequest {
    pub order_id: String,
    pub order_date: String,
    pub pickup_location: String,
    pub billing_customer_name: String,
    pub billing_last_name: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_pincode: String,
    pub billing_state: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub shipping_is_billing: bool,
    pub order_items: Vec<AdhocOrderItem>,
    pub payment_method: String,
    pub sub_total: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct AdhocOrderItem {
    pub name: String,
    pub sku: String,
    pub units: i32,
    pub selling_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct AdhocOrderResponse {
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub shipment_id: Option<i64>,
    #[serde(default)]
    pub awb_code: Option<String>,
    #[serde(default)]
    pub courier_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignAwbRequest {
    pub shipment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignAwbResponse {
    #[serde(default)]
    pub awb_assign_status: i64,
    #[serde(default)]
    pub response: Option<AssignAwbBody>,
}

#[derive(Debug, Deserialize)]
pub struct AssignAwbBody {
    #[serde(default)]
    pub data: Option<AssignAwbData>,
}

#[derive(Debug, Deserialize)]
pub struct AssignAwbData {
    #[serde(default)]
    pub awb_code: Option<String>,
    #[serde(default)]
    pub courier_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceabilityResponse {
    #[serde(default)]
    pub data: Option<ServiceabilityData>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceabilityData {
    #[serde(default)]
    pub available_courier_companies: Vec<AvailableCourier>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableCourier {
    #[serde(default)]
    pub courier_company_id: i64,
    #[serde(default)]
    pub courier_name: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub etd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackResponse {
    #[serde(default)]
    pub tracking_data: Option<TrackingData>,
}

#[derive(Debug, Deserialize)]
pub struct TrackingData {
    #[serde(default)]
    pub etd: Option<String>,
    #[serde(default)]
    pub shipment_track: Vec<ShipmentTrackLeg>,
    #[serde(default)]
    pub shipment_track_activities: Vec<ScanActivity>,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentTrackLeg {
    #[serde(default)]
    pub awb_code: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub courier_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanActivity {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelShipmentRequest<'a> {
    pub awbs: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ShipmentIdsRequest<'a> {
    pub shipment_id: &'a [i64],
}

#[derive(Debug, Deserialize)]
pub struct GeneratePickupResponse {
    #[serde(default)]
    pub response: Option<PickupBody>,
}

#[derive(Debug, Deserialize)]
pub struct PickupBody {
    #[serde(default)]
    pub pickup_token_number: Option<String>,
    #[serde(default)]
    pub pickup_scheduled_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateLabelResponse {
    #[serde(default)]
    pub label_created: i64,
    #[serde(default)]
    pub label_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrintInvoiceRequest<'a> {
    pub ids: &'a [i64],
}

#[derive(Debug, Deserialize)]
pub struct PrintInvoiceResponse {
    #[serde(default)]
    pub is_invoice_created: bool,
    #[serde(default)]
    pub invoice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PickupLocationsResponse {
    #[serde(default)]
    pub data: Option<PickupLocationsData>,
}

#[derive(Debug, Deserialize)]
pub struct PickupLocationsData {
    #[serde(default)]
    pub shipping_address: Vec<PickupAddressRow>,
}

#[derive(Debug, Deserialize)]
pub struct PickupAddressRow {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pin_code: String,
}
