use crate::models::{Order, OrderLine, Ticket};
use chrono::Utc;
use uuid::Uuid;

/// Stable QR payload for one order line. Whole-table lines carry seat 0,
/// matching the wire sentinel everywhere else.
pub fn ticket_code(order_id: Uuid, line: &OrderLine) -> String {
    format!(
        "MARQ-{}-{}-{}",
        order_id.simple(),
        line.table_id,
        line.seat_no
    )
}

/// Where the rendered QR image for a code can be fetched. Rendering itself
/// is handled by the presentation layer.
pub fn qr_code_url(api_base_url: &str, code: &str) -> String {
    format!("{}/qr/{}", api_base_url.trim_end_matches('/'), code)
}

/// One ticket per order line. Codes are deterministic per line; row ids are
/// fresh, and re-issue duplicates are suppressed by the store's
/// (order_id, table_id, seat_no) key, not here.
pub fn issue_tickets(order: &Order) -> Vec<Ticket> {
    order
        .lines
        .iter()
        .map(|line| Ticket {
            id: Uuid::new_v4(),
            order_id: order.id,
            table_id: line.table_id.clone(),
            seat_no: line.seat_no,
            code: ticket_code(order.id, line),
            issued_at: Utc::now(),
        })
        .collect()
}
