use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vastra_api::{app, state::{AppState, AuthConfig}};
use vastra_api::notify::MailNotifier;
use vastra_carrier::{HeuristicAddressParser, ShiprocketClient, ShiprocketConfig};
use vastra_core::carrier::CarrierGateway;
use vastra_core::repository::OrderRepository;
use vastra_shipping::{ShipmentOrchestrator, WebhookIngestor};
use vastra_store::StoreOrderRepository;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vastra_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = vastra_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Vastra shipping API on port {}", config.server.port);

    // Postgres Connection
    let db = vastra_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let orders: Arc<dyn OrderRepository> = Arc::new(StoreOrderRepository::new(db.pool.clone()));

    // Carrier Client
    let carrier: Arc<dyn CarrierGateway> = Arc::new(
        ShiprocketClient::new(ShiprocketConfig {
            email: config.carrier.email.clone(),
            password: config.carrier.password.clone(),
            base_url: config.carrier.base_url.clone(),
            pickup_location: config.carrier.pickup_location.clone(),
            timeout_seconds: config.carrier.timeout_seconds,
        })
        .expect("Failed to build carrier client"),
    );

    let notifier = Arc::new(MailNotifier::new(&config.mail).expect("Failed to build mail notifier"));

    let orchestrator = Arc::new(ShipmentOrchestrator::new(
        orders.clone(),
        carrier.clone(),
        Arc::new(HeuristicAddressParser),
        notifier,
        config.carrier.pickup_location.clone(),
        config.carrier.enabled,
    ));

    let ingestor = Arc::new(WebhookIngestor::new(orders.clone()));

    let app_state = AppState {
        orders,
        carrier,
        orchestrator,
        ingestor,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
