pub mod app_config;
pub mod database;
pub mod lock_repo;
pub mod memory;
pub mod order_repo;

pub use database::DbClient;
pub use lock_repo::PgLockStore;
pub use memory::MemoryLockStore;
pub use order_repo::PgOrderRepository;
