use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vastra_core::repository::OrderRepository;
use vastra_shared::{Masked, Order, OrderItem, OrderStatus, TrackingEvent};

const ORDER_COLUMNS: &str = "id, customer_id, customer_name, customer_email, customer_phone, \
     status, courier, tracking_number, shipping_address, total_paise, currency, \
     created_at, updated_at";

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, name, sku, size, quantity, price_paise \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn assemble(
        &self,
        row: OrderRow,
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let items = self.load_items(row.id).await?;
        row.into_order(items)
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    status: String,
    courier: Option<String>,
    tracking_number: Option<String>,
    shipping_address: String,
    total_paise: i64,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(
        self,
        items: Vec<OrderItem>,
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| format!("Unknown order status '{}'", self.status))?;

        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email.map(Masked),
            customer_phone: self.customer_phone.map(Masked),
            status,
            courier: self.courier,
            tracking_number: self.tracking_number,
            shipping_address: self.shipping_address,
            total_paise: self.total_paise,
            currency: self.currency,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Option<Uuid>,
    name: String,
    sku: Option<String>,
    size: Option<String>,
    quantity: i32,
    price_paise: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            name: row.name,
            sku: row.sku,
            size: row.size,
            quantity: row.quantity,
            price_paise: row.price_paise,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TrackingEventRow {
    id: Uuid,
    order_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<TrackingEventRow> for TrackingEvent {
    fn from(row: TrackingEventRow) -> Self {
        TrackingEvent {
            id: row.id,
            order_id: row.order_id,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE tracking_number = $1",
            ORDER_COLUMNS
        ))
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn mark_shipped(
        &self,
        id: Uuid,
        courier: &str,
        tracking_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        // Conditional update: the transition happens at most once even under
        // concurrent ship calls for the same order.
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders \
             SET status = 'shipped', courier = $2, tracking_number = $3, updated_at = NOW() \
             WHERE id = $1 AND status IN ('confirmed', 'processing') \
             RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(courier)
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_tracking_event(
        &self,
        order_id: Uuid,
        status: &str,
    ) -> Result<TrackingEvent, Box<dyn std::error::Error + Send + Sync>> {
        let row: TrackingEventRow = sqlx::query_as(
            "INSERT INTO tracking_events (id, order_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING id, order_id, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_tracking_events(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<TrackingEventRow> = sqlx::query_as(
            "SELECT id, order_id, status, created_at \
             FROM tracking_events WHERE order_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrackingEvent::from).collect())
    }
}
