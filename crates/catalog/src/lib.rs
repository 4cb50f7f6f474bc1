//! Catalog module.
//!
//! Products are referenced by order lines; the catalog itself is maintained
//! elsewhere, so this crate only carries the record and its validation rules.

pub mod product;

pub use product::Product;
