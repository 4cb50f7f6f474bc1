//! Stocks module.
//!
//! Stock records are reservations created on behalf of document lines. This
//! crate owns the record shape and the collaborator contract used to create
//! them; reservation and allocation policy live elsewhere.

pub mod repository;
pub mod stock;
pub mod warehouse;

pub use repository::{InMemoryStockRepository, StockError, StockRepository};
pub use stock::Stock;
pub use warehouse::Warehouse;
