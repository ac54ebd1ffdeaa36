use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;
use uuid::Uuid;

use vastra_api::state::{AppState, AuthConfig};
use vastra_core::carrier::{
    AddressParser, AwbAssignment, CarrierGateway, CarrierOrderReceipt, CarrierOrderRequest,
    ParsedAddress, PickupConfirmation, PickupLocation, ServiceabilityQuery, ServiceableCourier,
    TrackingSnapshot,
};
use vastra_core::error::{CarrierError, NotifyError};
use vastra_core::notify::Notifier;
use vastra_core::repository::OrderRepository;
use vastra_shared::{Order, OrderStatus, TrackingEvent};
use vastra_shipping::{ShipmentOrchestrator, WebhookIngestor};

const TEST_SECRET: &str = "test-secret";

// ============================================================================
// Test doubles
// ============================================================================

struct EmptyOrderRepository;

#[async_trait]
impl OrderRepository for EmptyOrderRepository {
    async fn get_order(
        &self,
        _id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(None)
    }

    async fn find_by_tracking_number(
        &self,
        _tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(None)
    }

    async fn mark_shipped(
        &self,
        _id: Uuid,
        _courier: &str,
        _tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(None)
    }

    async fn update_status(
        &self,
        _id: Uuid,
        _status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    async fn append_tracking_event(
        &self,
        order_id: Uuid,
        status: &str,
    ) -> Result<TrackingEvent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(TrackingEvent::new(order_id, status.to_string()))
    }

    async fn list_tracking_events(
        &self,
        _order_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Vec::new())
    }
}

struct StubCarrier;

#[async_trait]
impl CarrierGateway for StubCarrier {
    async fn create_order(
        &self,
        _request: &CarrierOrderRequest,
    ) -> Result<CarrierOrderReceipt, CarrierError> {
        Err(CarrierError::Order("not under test".to_string()))
    }

    async fn assign_awb(
        &self,
        _shipment_id: i64,
        _courier_id: Option<i64>,
    ) -> Result<AwbAssignment, CarrierError> {
        Err(CarrierError::Awb("not under test".to_string()))
    }

    async fn check_serviceability(
        &self,
        _query: &ServiceabilityQuery,
    ) -> Result<Vec<ServiceableCourier>, CarrierError> {
        Ok(vec![ServiceableCourier {
            courier_id: 11,
            name: "Delhivery".to_string(),
            rate_paise: 6500,
            estimated_days: Some("3".to_string()),
        }])
    }

    async fn track_by_awb(&self, _awb: &str) -> Result<TrackingSnapshot, CarrierError> {
        Err(CarrierError::Transport("not under test".to_string()))
    }

    async fn track_by_order_id(
        &self,
        _carrier_order_id: i64,
    ) -> Result<TrackingSnapshot, CarrierError> {
        Err(CarrierError::Transport("not under test".to_string()))
    }

    async fn cancel_shipments(&self, _awbs: &[String]) -> Result<(), CarrierError> {
        Ok(())
    }

    async fn schedule_pickup(
        &self,
        _shipment_ids: &[i64],
    ) -> Result<PickupConfirmation, CarrierError> {
        Ok(PickupConfirmation {
            pickup_token: None,
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

struct PassthroughParser;

impl AddressParser for PassthroughParser {
    fn parse(&self, raw: &str) -> ParsedAddress {
        ParsedAddress {
            street: raw.to_string(),
            city: "Unknown".to_string(),
            state: "Unknown".to_string(),
            pincode: "000000".to_string(),
        }
    }
}

struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn order_shipped(&self, _order: &Order) -> Result<(), NotifyError> {
        Ok(())
    }
}

fn test_app() -> axum::Router {
    let orders: Arc<dyn OrderRepository> = Arc::new(EmptyOrderRepository);
    let carrier: Arc<dyn CarrierGateway> = Arc::new(StubCarrier);
    let orchestrator = Arc::new(ShipmentOrchestrator::new(
        orders.clone(),
        carrier.clone(),
        Arc::new(PassthroughParser),
        Arc::new(SilentNotifier),
        "Primary".to_string(),
        true,
    ));
    let ingestor = Arc::new(WebhookIngestor::new(orders.clone()));

    vastra_api::app(AppState {
        orders,
        carrier,
        orchestrator,
        ingestor,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
    })
}

fn seller_token() -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use vastra_api::middleware::auth::SellerClaims;

    let claims = SellerClaims {
        sub: "seller-1".to_string(),
        email: None,
        role: "SELLER".to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_ship_requires_authentication() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/orders/{}/ship", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ship_unknown_order_is_404_for_seller() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/orders/{}/ship-manual", Uuid::new_v4()))
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", seller_token()))
                .body(Body::from(
                    r#"{"courier": "BlueDart", "tracking_number": "BD123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use vastra_api::middleware::auth::SellerClaims;

    let app = test_app();
    let claims = SellerClaims {
        sub: "cust-1".to_string(),
        email: None,
        role: "CUSTOMER".to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/orders/{}/ship", Uuid::new_v4()))
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_webhook_unknown_awb_is_acknowledged() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/webhooks/shiprocket")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"awb": "AWB404", "current_status": "Delivered"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_without_awb_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/webhooks/shiprocket")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"current_status": "Delivered"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serviceability_is_public() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/serviceability?pickup_pincode=560001&delivery_pincode=400050&weight=0.5&cod=false")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
