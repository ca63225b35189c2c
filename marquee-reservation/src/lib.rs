pub mod engine;
pub mod view;

pub use engine::ReservationEngine;
