//! `erpline-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, record timestamps and the document
//! capability traits shared by every document line type.

pub mod aggregate;
pub mod document;
pub mod entity;
pub mod error;
pub mod id;
pub mod timestamps;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use document::{Document, DocumentItem};
pub use entity::{Entity, SoftDeletes};
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, OrderItemId, ProductId, StockId, WarehouseId};
pub use timestamps::Timestamps;
pub use value_object::ValueObject;
