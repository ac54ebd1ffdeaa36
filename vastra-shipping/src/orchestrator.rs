use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use vastra_core::carrier::{
    AddressParser, CarrierGateway, CarrierOrderItem, CarrierOrderRequest, PaymentMethod,
    PickupConfirmation, TrackingSnapshot,
};
use vastra_core::error::{CarrierError, ShippingError};
use vastra_core::notify::Notifier;
use vastra_core::repository::OrderRepository;
use vastra_shared::{Order, OrderStatus, TrackingEvent};

/// Label used when a shipment exists at the carrier but no waybill could be
/// assigned; the synthetic tracking id keeps the order shippable.
const FALLBACK_COURIER: &str = "Shiprocket";

/// Placeholder contact details for orders missing them; the carrier rejects
/// orders without a phone and email.
const FILLER_PHONE: &str = "9999999999";
const FILLER_EMAIL: &str = "customer@vastra.shop";

const DEFAULT_WEIGHT_KG: f64 = 0.5;

/// Transient shipping input; never stored verbatim.
#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub use_carrier: bool,
}

impl Default for ShipmentRequest {
    fn default() -> Self {
        Self {
            courier: None,
            tracking_number: None,
            use_carrier: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShipmentOutcome {
    pub order: Order,
    pub carrier_order_id: Option<i64>,
    pub awb: Option<String>,
}

/// What the carrier path settled on for one shipment
struct CarrierShipment {
    order_id: i64,
    awb: Option<String>,
    courier: String,
    tracking_number: String,
}

/// Drives the confirmed/processing -> shipped transition, choosing between
/// the carrier integration and the manual path, and narrating the result
/// into the tracking ledger.
pub struct ShipmentOrchestrator {
    orders: Arc<dyn OrderRepository>,
    carrier: Arc<dyn CarrierGateway>,
    parser: Arc<dyn AddressParser>,
    notifier: Arc<dyn Notifier>,
    pickup_location: String,
    carrier_enabled: bool,
}

impl ShipmentOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        carrier: Arc<dyn CarrierGateway>,
        parser: Arc<dyn AddressParser>,
        notifier: Arc<dyn Notifier>,
        pickup_location: String,
        carrier_enabled: bool,
    ) -> Self {
        Self {
            orders,
            carrier,
            parser,
            notifier,
            pickup_location,
            carrier_enabled,
        }
    }

    pub async fn ship_order(
        &self,
        order_id: Uuid,
        request: ShipmentRequest,
    ) -> Result<ShipmentOutcome, ShippingError> {
        // 1. Load order with items
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(ShippingError::storage)?
            .ok_or(ShippingError::OrderNotFound(order_id))?;

        // 2. Only confirmed/processing orders can ship
        if !order.status.is_shippable() {
            return Err(ShippingError::InvalidStateTransition {
                from: order.status.to_string(),
            });
        }

        let manual_courier = non_empty(request.courier.as_deref());
        let manual_tracking = non_empty(request.tracking_number.as_deref());

        let mut carrier_order_id = None;
        let mut awb = None;

        // 3. Carrier path, with manual fallback when the provider fails
        let (courier, tracking_number) = if request.use_carrier && self.carrier_enabled {
            match self.ship_via_carrier(&order).await {
                Ok(shipment) => {
                    carrier_order_id = Some(shipment.order_id);
                    awb = shipment.awb;
                    (shipment.courier, shipment.tracking_number)
                }
                Err(err) => match (manual_courier, manual_tracking) {
                    (Some(courier), Some(tracking)) => {
                        warn!(
                            order_id = %order_id,
                            error = %err,
                            "Carrier integration failed, shipping with supplied manual details"
                        );
                        (courier, tracking)
                    }
                    _ => return Err(ShippingError::CarrierIntegrationFailed(err.to_string())),
                },
            }
        } else {
            // 4. Manual path needs both fields
            match (manual_courier, manual_tracking) {
                (Some(courier), Some(tracking)) => (courier, tracking),
                _ => return Err(ShippingError::MissingShippingDetails),
            }
        };

        // 5. Atomic conditional transition; None means the state changed
        // underneath us and the shipment must not be applied twice
        let updated = self
            .orders
            .mark_shipped(order_id, &courier, &tracking_number)
            .await
            .map_err(ShippingError::storage)?;

        let updated = match updated {
            Some(order) => order,
            None => {
                let current = self
                    .orders
                    .get_order(order_id)
                    .await
                    .map_err(ShippingError::storage)?
                    .ok_or(ShippingError::OrderNotFound(order_id))?;
                return Err(ShippingError::InvalidStateTransition {
                    from: current.status.to_string(),
                });
            }
        };

        // 6. Exactly one tracking event per shipment
        let event_text = match &awb {
            Some(awb) => format!("Shipped via {} | AWB: {}", courier, awb),
            None => format!("Shipped via {} | Tracking ID: {}", courier, tracking_number),
        };
        self.orders
            .append_tracking_event(order_id, &event_text)
            .await
            .map_err(ShippingError::storage)?;

        info!(
            order_id = %order_id,
            courier = %courier,
            tracking_number = %tracking_number,
            "Order shipped"
        );

        // 7. Fire-and-forget notification
        self.dispatch_shipped_notification(updated.clone());

        Ok(ShipmentOutcome {
            order: updated,
            carrier_order_id,
            awb,
        })
    }

    /// The manual path directly; both fields mandatory.
    pub async fn ship_order_manual(
        &self,
        order_id: Uuid,
        courier: &str,
        tracking_number: &str,
    ) -> Result<ShipmentOutcome, ShippingError> {
        self.ship_order(
            order_id,
            ShipmentRequest {
                courier: Some(courier.to_string()),
                tracking_number: Some(tracking_number.to_string()),
                use_carrier: false,
            },
        )
        .await
    }

    /// Register the order with the carrier and settle on courier + tracking.
    ///
    /// An AWB failure is absorbed: the shipment falls back to the carrier
    /// order reference so a waybill hiccup alone never blocks shipping.
    async fn ship_via_carrier(&self, order: &Order) -> Result<CarrierShipment, CarrierError> {
        let address = self.parser.parse(&order.shipping_address);
        let phone = order
            .customer_phone
            .as_ref()
            .map(|p| p.as_ref().clone())
            .unwrap_or_else(|| FILLER_PHONE.to_string());
        let email = order
            .customer_email
            .as_ref()
            .map(|e| e.as_ref().clone())
            .unwrap_or_else(|| FILLER_EMAIL.to_string());

        let request = CarrierOrderRequest {
            reference_id: order.id.to_string(),
            customer_name: order
                .customer_name
                .clone()
                .unwrap_or_else(|| "Customer".to_string()),
            email,
            phone,
            address,
            items: order
                .items
                .iter()
                .map(|item| CarrierOrderItem {
                    name: item.name.clone(),
                    sku: item
                        .sku
                        .clone()
                        .unwrap_or_else(|| item.id.to_string()),
                    units: item.quantity,
                    selling_price_paise: item.price_paise,
                })
                .collect(),
            subtotal_paise: order.total_paise,
            payment_method: PaymentMethod::Prepaid,
            pickup_location: self.pickup_location.clone(),
            weight_kg: DEFAULT_WEIGHT_KG,
        };

        let receipt = self.carrier.create_order(&request).await?;

        if let Some(shipment_id) = receipt.shipment_id {
            match self.carrier.assign_awb(shipment_id, None).await {
                Ok(assignment) => {
                    return Ok(CarrierShipment {
                        order_id: receipt.order_id,
                        tracking_number: assignment.awb.clone(),
                        awb: Some(assignment.awb),
                        courier: assignment.courier,
                    });
                }
                Err(err) => {
                    warn!(
                        order_id = %order.id,
                        shipment_id,
                        error = %err,
                        "AWB assignment failed, falling back to carrier order reference"
                    );
                }
            }
        }

        if let (Some(awb), Some(courier)) = (receipt.awb.clone(), receipt.courier.clone()) {
            return Ok(CarrierShipment {
                order_id: receipt.order_id,
                tracking_number: awb.clone(),
                awb: Some(awb),
                courier,
            });
        }

        Ok(CarrierShipment {
            tracking_number: format!("SR{}", receipt.order_id),
            order_id: receipt.order_id,
            awb: None,
            courier: FALLBACK_COURIER.to_string(),
        })
    }

    /// Administrative narration; never touches the order status.
    pub async fn add_tracking_update(
        &self,
        order_id: Uuid,
        status: &str,
        location: Option<&str>,
    ) -> Result<TrackingEvent, ShippingError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(ShippingError::storage)?
            .ok_or(ShippingError::OrderNotFound(order_id))?;

        let text = match location.map(str::trim).filter(|l| !l.is_empty()) {
            Some(location) => format!("{} at {}", status, location),
            None => status.to_string(),
        };

        self.orders
            .append_tracking_event(order_id, &text)
            .await
            .map_err(ShippingError::storage)
    }

    /// Cancel locally no matter what the carrier says; local consistency is
    /// favored over carrier consistency.
    pub async fn cancel_shipment(&self, order_id: Uuid) -> Result<Order, ShippingError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(ShippingError::storage)?
            .ok_or(ShippingError::OrderNotFound(order_id))?;

        if let Some(tracking) = &order.tracking_number {
            if let Err(err) = self
                .carrier
                .cancel_shipments(std::slice::from_ref(tracking))
                .await
            {
                warn!(
                    order_id = %order_id,
                    error = %err,
                    "Carrier cancellation failed, cancelling locally anyway"
                );
            }
        }

        self.orders
            .update_status(order_id, OrderStatus::Cancelled)
            .await
            .map_err(ShippingError::storage)?;

        if let Err(err) = self
            .orders
            .append_tracking_event(order_id, "Shipment cancelled")
            .await
        {
            error!(order_id = %order_id, error = %err, "Failed to record cancellation event");
        }

        self.orders
            .get_order(order_id)
            .await
            .map_err(ShippingError::storage)?
            .ok_or(ShippingError::OrderNotFound(order_id))
    }

    /// Carrier tracking snapshot; provider failures degrade to None.
    pub async fn carrier_tracking(
        &self,
        order_id: Uuid,
    ) -> Result<Option<TrackingSnapshot>, ShippingError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(ShippingError::storage)?
            .ok_or(ShippingError::OrderNotFound(order_id))?;

        let Some(awb) = order.tracking_number else {
            return Ok(None);
        };

        match self.carrier.track_by_awb(&awb).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(order_id = %order_id, awb = %awb, error = %err, "Carrier tracking lookup failed");
                Ok(None)
            }
        }
    }

    pub async fn shipping_label(&self, shipment_ids: &[i64]) -> Result<String, ShippingError> {
        self.carrier
            .shipping_label(shipment_ids)
            .await
            .map_err(|e| ShippingError::CarrierIntegrationFailed(e.to_string()))
    }

    pub async fn schedule_pickup(
        &self,
        shipment_ids: &[i64],
    ) -> Result<PickupConfirmation, ShippingError> {
        self.carrier
            .schedule_pickup(shipment_ids)
            .await
            .map_err(|e| ShippingError::CarrierIntegrationFailed(e.to_string()))
    }

    fn dispatch_shipped_notification(&self, order: Order) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.order_shipped(&order).await {
                error!(order_id = %order.id, error = %err, "Shipped notification failed");
            }
        });
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
