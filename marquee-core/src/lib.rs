pub mod error;
pub mod payment;
pub mod repository;

pub use error::LockError;
pub use repository::LockStore;
