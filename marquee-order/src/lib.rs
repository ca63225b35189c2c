pub mod fulfillment;
pub mod models;
pub mod notify;
pub mod repository;
pub mod settlement;

pub use models::{Order, OrderError, OrderLine, OrderStatus, Ticket};
pub use repository::OrderRepository;
pub use settlement::SettlementReconciler;
