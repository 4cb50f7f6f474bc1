//! Infrastructure layer: record storage, the order item persistence pipeline,
//! relation loading and configuration.

pub mod config;
pub mod record_store;
pub mod relations;
pub mod repository;

pub use config::RepositoryConfig;
pub use record_store::{InMemoryRecordStore, RecordStore, Records, StoreError};
pub use relations::OrderItemRelations;
pub use repository::{OrderItemRepository, PersistError};
