//! In-memory doubles for the orchestrator and webhook tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use vastra_core::carrier::{
    AwbAssignment, CarrierGateway, CarrierOrderReceipt, CarrierOrderRequest, PickupConfirmation,
    PickupLocation, ServiceabilityQuery, ServiceableCourier, TrackingSnapshot,
};
use vastra_core::error::{CarrierError, NotifyError};
use vastra_core::notify::Notifier;
use vastra_core::repository::OrderRepository;
use vastra_shared::{Order, OrderItem, OrderStatus, TrackingEvent};

pub struct MockOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
    events: Mutex<Vec<TrackingEvent>>,
}

impl MockOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub async fn seed(&self, status: OrderStatus) -> Order {
        let mut order = Order::new(
            "cust-42".to_string(),
            "12 MG Road, Bangalore, Karnataka - 560001".to_string(),
        );
        order.customer_name = Some("Asha Verma".to_string());
        order.status = status;
        let item = OrderItem::new(order.id, "Linen Kurta".to_string(), 1, 129900);
        order.add_item(item);

        self.orders.lock().await.insert(order.id, order.clone());
        order
    }

    pub async fn set_tracking(&self, id: Uuid, courier: &str, tracking: &str) {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(&id).expect("order seeded");
        order.courier = Some(courier.to_string());
        order.tracking_number = Some(tracking.to_string());
    }

    pub async fn get(&self, id: Uuid) -> Order {
        self.orders.lock().await.get(&id).expect("order seeded").clone()
    }

    pub async fn events_for(&self, id: Uuid) -> Vec<TrackingEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.order_id == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .orders
            .lock()
            .await
            .values()
            .find(|o| o.tracking_number.as_deref() == Some(tracking_number))
            .cloned())
    }

    async fn mark_shipped(
        &self,
        id: Uuid,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) if order.status.is_shippable() => {
                order.status = OrderStatus::Shipped;
                order.courier = Some(courier.to_string());
                order.tracking_number = Some(tracking_number.to_string());
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(&id).ok_or("order not found")?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn append_tracking_event(
        &self,
        order_id: Uuid,
        status: &str,
    ) -> Result<TrackingEvent, Box<dyn std::error::Error + Send + Sync>> {
        let event = TrackingEvent::new(order_id, status.to_string());
        self.events.lock().await.push(event.clone());
        Ok(event)
    }

    async fn list_tracking_events(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let mut events: Vec<TrackingEvent> = self
            .events
            .lock()
            .await
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect();
        events.reverse();
        Ok(events)
    }
}

pub struct MockCarrierGateway {
    fail_create: bool,
    fail_awb: bool,
    fail_cancel: bool,
    fail_track: bool,
    shipment_id: Option<i64>,
    create_calls: AtomicUsize,
}

impl MockCarrierGateway {
    pub fn happy() -> Self {
        Self {
            fail_create: false,
            fail_awb: false,
            fail_cancel: false,
            fail_track: false,
            shipment_id: Some(9001),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_create_failure(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn with_awb_failure(mut self) -> Self {
        self.fail_awb = true;
        self
    }

    pub fn with_cancel_failure(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    pub fn with_track_failure(mut self) -> Self {
        self.fail_track = true;
        self
    }

    pub fn without_shipment_id(mut self) -> Self {
        self.shipment_id = None;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CarrierGateway for MockCarrierGateway {
    async fn create_order(
        &self,
        _request: &CarrierOrderRequest,
    ) -> Result<CarrierOrderReceipt, CarrierError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(CarrierError::Order("provider rejected order".to_string()));
        }
        Ok(CarrierOrderReceipt {
            order_id: 5001,
            shipment_id: self.shipment_id,
            awb: None,
            courier: None,
        })
    }

    async fn assign_awb(
        &self,
        _shipment_id: i64,
        _courier_id: Option<i64>,
    ) -> Result<AwbAssignment, CarrierError> {
        if self.fail_awb {
            return Err(CarrierError::Awb("no courier available".to_string()));
        }
        Ok(AwbAssignment {
            awb: "AWB777".to_string(),
            courier: "Delhivery".to_string(),
        })
    }

    async fn check_serviceability(
        &self,
        _query: &ServiceabilityQuery,
    ) -> Result<Vec<ServiceableCourier>, CarrierError> {
        Ok(Vec::new())
    }

    async fn track_by_awb(&self, awb: &str) -> Result<TrackingSnapshot, CarrierError> {
        if self.fail_track {
            return Err(CarrierError::Transport("provider unavailable".to_string()));
        }
        Ok(TrackingSnapshot {
            awb: awb.to_string(),
            current_status: "In Transit".to_string(),
            etd: None,
            courier: Some("Delhivery".to_string()),
            scans: Vec::new(),
        })
    }

    async fn track_by_order_id(
        &self,
        _carrier_order_id: i64,
    ) -> Result<TrackingSnapshot, CarrierError> {
        self.track_by_awb("").await
    }

    async fn cancel_shipments(&self, _awbs: &[String]) -> Result<(), CarrierError> {
        if self.fail_cancel {
            return Err(CarrierError::Api {
                status: 422,
                message: "shipment already handed to courier".to_string(),
            });
        }
        Ok(())
    }

    async fn schedule_pickup(
        &self,
        _shipment_ids: &[i64],
    ) -> Result<PickupConfirmation, CarrierError> {
        Ok(PickupConfirmation {
            pickup_token: Some("PT-1".to_string()),
            scheduled_date: None,
        })
    }

    async fn shipping_label(&self, _shipment_ids: &[i64]) -> Result<String, CarrierError> {
        Ok("https://labels.example/label.pdf".to_string())
    }

    async fn invoice(&self, _carrier_order_ids: &[i64]) -> Result<String, CarrierError> {
        Ok("https://labels.example/invoice.pdf".to_string())
    }

    async fn pickup_locations(&self) -> Vec<PickupLocation> {
        Vec::new()
    }
}

pub struct MockNotifier {
    sent: AtomicUsize,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: AtomicUsize::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn order_shipped(&self, _order: &Order) -> Result<(), NotifyError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
