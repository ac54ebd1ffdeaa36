use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vastra_core::carrier::{
    PickupConfirmation, ServiceabilityQuery, ServiceableCourier, TrackingSnapshot,
};
use vastra_shared::{Masked, Order, OrderItem, OrderStatus, TrackingEvent};
use vastra_shipping::ShipmentRequest;

use crate::error::AppError;
use crate::middleware::auth::seller_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ShipOrderRequest {
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    #[serde(default = "default_use_carrier")]
    pub use_carrier: bool,
}

fn default_use_carrier() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ShipOrderManualRequest {
    pub courier: String,
    pub tracking_number: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackUpdateRequest {
    pub status: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceabilityParams {
    pub pickup_pincode: String,
    pub delivery_pincode: String,
    pub weight: f64,
    #[serde(default)]
    pub cod: bool,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentIdsRequest {
    pub shipment_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<Masked<String>>,
    pub status: OrderStatus,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_address: String,
    pub total_paise: i64,
    pub currency: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    pub price_paise: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            status: order.status,
            courier: order.courier,
            tracking_number: order.tracking_number,
            shipping_address: order.shipping_address,
            total_paise: order.total_paise,
            currency: order.currency,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            name: item.name,
            sku: item.sku,
            size: item.size,
            quantity: item.quantity,
            price_paise: item.price_paise,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShipOrderResponse {
    pub order: OrderResponse,
    pub carrier_order_id: Option<i64>,
    pub awb: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label_url: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    let seller = Router::new()
        .route("/v1/orders/{id}/ship", post(ship_order))
        .route("/v1/orders/{id}/ship-manual", post(ship_order_manual))
        .route("/v1/orders/{id}/track", post(add_tracking_update))
        .route("/v1/orders/{id}/cancel-shipment", post(cancel_shipment))
        .route("/v1/shipments/label", post(shipping_label))
        .route("/v1/shipments/pickup", post(schedule_pickup))
        .layer(middleware::from_fn_with_state(state, seller_auth_middleware));

    let public = Router::new()
        .route("/v1/orders/{id}/tracking-events", get(tracking_events))
        .route("/v1/orders/{id}/shiprocket-track", get(shiprocket_track))
        .route("/v1/serviceability", get(serviceability));

    seller.merge(public)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/orders/:id/ship
/// Ship an order through the carrier integration, with optional manual
/// details as a fallback
pub async fn ship_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<ShipOrderRequest>,
) -> Result<Json<ShipOrderResponse>, AppError> {
    let outcome = state
        .orchestrator
        .ship_order(
            order_id,
            ShipmentRequest {
                courier: req.courier,
                tracking_number: req.tracking_number,
                use_carrier: req.use_carrier,
            },
        )
        .await?;

    Ok(Json(ShipOrderResponse {
        order: outcome.order.into(),
        carrier_order_id: outcome.carrier_order_id,
        awb: outcome.awb,
    }))
}

/// POST /v1/orders/:id/ship-manual
/// Ship with seller-supplied courier and tracking number only
pub async fn ship_order_manual(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<ShipOrderManualRequest>,
) -> Result<Json<ShipOrderResponse>, AppError> {
    if req.courier.trim().is_empty() || req.tracking_number.trim().is_empty() {
        return Err(AppError::ValidationError(
            "courier and tracking_number are required".to_string(),
        ));
    }

    let outcome = state
        .orchestrator
        .ship_order_manual(order_id, &req.courier, &req.tracking_number)
        .await?;

    Ok(Json(ShipOrderResponse {
        order: outcome.order.into(),
        carrier_order_id: outcome.carrier_order_id,
        awb: outcome.awb,
    }))
}

/// POST /v1/orders/:id/track
/// Append an administrative tracking note; does not change the order status
pub async fn add_tracking_update(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<TrackUpdateRequest>,
) -> Result<Json<TrackingEvent>, AppError> {
    if req.status.trim().is_empty() {
        return Err(AppError::ValidationError("status is required".to_string()));
    }

    let event = state
        .orchestrator
        .add_tracking_update(order_id, req.status.trim(), req.location.as_deref())
        .await?;

    Ok(Json(event))
}

/// GET /v1/orders/:id/tracking-events
/// The order's tracking ledger, newest first
pub async fn tracking_events(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<TrackingEvent>>, AppError> {
    state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let events = state.orders.list_tracking_events(order_id).await?;
    Ok(Json(events))
}

/// GET /v1/orders/:id/shiprocket-track
/// Live carrier snapshot; 404 when the order has no tracking number or the
/// provider has nothing for it
pub async fn shiprocket_track(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<TrackingSnapshot>, AppError> {
    let snapshot = state
        .orchestrator
        .carrier_tracking(order_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFoundError("No tracking information available".to_string())
        })?;

    Ok(Json(snapshot))
}

/// POST /v1/orders/:id/cancel-shipment
/// Cancel locally regardless of the carrier outcome
pub async fn cancel_shipment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orchestrator.cancel_shipment(order_id).await?;
    Ok(Json(order.into()))
}

/// GET /v1/serviceability
/// Which couriers can carry a parcel between two pincodes
pub async fn serviceability(
    State(state): State<AppState>,
    Query(params): Query<ServiceabilityParams>,
) -> Result<Json<Vec<ServiceableCourier>>, AppError> {
    let couriers = state
        .carrier
        .check_serviceability(&ServiceabilityQuery {
            pickup_pincode: params.pickup_pincode,
            delivery_pincode: params.delivery_pincode,
            weight_kg: params.weight,
            cod: params.cod,
        })
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    Ok(Json(couriers))
}

/// POST /v1/shipments/label
pub async fn shipping_label(
    State(state): State<AppState>,
    Json(req): Json<ShipmentIdsRequest>,
) -> Result<Json<LabelResponse>, AppError> {
    let label_url = state.orchestrator.shipping_label(&req.shipment_ids).await?;
    Ok(Json(LabelResponse { label_url }))
}

/// POST /v1/shipments/pickup
pub async fn schedule_pickup(
    State(state): State<AppState>,
    Json(req): Json<ShipmentIdsRequest>,
) -> Result<Json<PickupConfirmation>, AppError> {
    let confirmation = state.orchestrator.schedule_pickup(&req.shipment_ids).await?;
    Ok(Json(confirmation))
}
