use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_order::models::{Order, OrderLine, OrderStatus, Ticket};
use marquee_order::repository::OrderRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    event_id: Uuid,
    customer_email: String,
    status: String,
    hold_id: Option<String>,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    table_id: String,
    seat_no: i16,
    price_cents: i64,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    order_id: Uuid,
    table_id: String,
    seat_no: i16,
    code: String,
    issued_at: DateTime<Utc>,
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, event_id, customer_email, status, hold_id, total_cents) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order.id)
        .bind(order.event_id)
        .bind(&order.customer_email)
        .bind(order.status.as_str())
        .bind(&order.hold_id)
        .bind(order.total_cents)
        .execute(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO order_lines (order_id, table_id, seat_no, price_cents) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(&line.table_id)
            .bind(line.seat_no)
            .bind(line.price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order.id)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, event_id, customer_email, status, hold_id, total_cents, created_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT table_id, seat_no, price_cents FROM order_lines \
             WHERE order_id = $1 ORDER BY table_id, seat_no",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| format!("unknown order status '{}' for order {}", row.status, id))?;

        Ok(Some(Order {
            id: row.id,
            event_id: row.event_id,
            customer_email: row.customer_email,
            status,
            hold_id: row.hold_id,
            lines: lines
                .into_iter()
                .map(|l| OrderLine {
                    table_id: l.table_id,
                    seat_no: l.seat_no,
                    price_cents: l.price_cents,
                })
                .collect(),
            total_cents: row.total_cents,
            created_at: row.created_at,
        }))
    }

    async fn update_order_status(
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

    async fn add_ticket(
        &self,
        ticket: &Ticket,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO tickets (id, order_id, table_id, seat_no, code, issued_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (order_id, table_id, seat_no) DO NOTHING",
        )
        .bind(ticket.id)
        .bind(ticket.order_id)
        .bind(&ticket.table_id)
        .bind(ticket.seat_no)
        .bind(&ticket.code)
        .bind(ticket.issued_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_tickets(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT id, order_id, table_id, seat_no, code, issued_at FROM tickets \
             WHERE order_id = $1 ORDER BY table_id, seat_no",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|t| Ticket {
                id: t.id,
                order_id: t.order_id,
                table_id: t.table_id,
                seat_no: t.seat_no,
                code: t.code,
                issued_at: t.issued_at,
            })
            .collect())
    }
}
