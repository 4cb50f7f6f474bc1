//! Document capability traits.
//!
//! ERP documents (sales orders, purchase receipts, transfers, ...) share a common
//! shape: a header that lives in a warehouse and a set of lines that each point at
//! a product with a price and a quantity. Collaborators such as the stock
//! repository work against these traits rather than concrete line types.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::id::{ProductId, StockId, WarehouseId};

/// A document header that owns lines.
pub trait Document {
    /// Identifier of the document, independent of its concrete type.
    fn document_id(&self) -> Uuid;

    /// Warehouse the document operates in.
    fn warehouse_id(&self) -> WarehouseId;
}

/// A single line of a document.
pub trait DocumentItem {
    /// Identifier of the line, independent of its concrete type.
    fn item_id(&self) -> Uuid;

    /// Identifier of the owning document.
    fn document_id(&self) -> Uuid;

    fn product_id(&self) -> ProductId;

    /// Stock record associated with this line, if any.
    fn stock_id(&self) -> Option<StockId>;

    fn price(&self) -> Decimal;

    fn qty(&self) -> Decimal;

    /// Line total, `None` while it has not been set or computed.
    fn total(&self) -> Option<Decimal>;

    fn weight(&self) -> Option<Decimal>;

    fn volume(&self) -> Option<Decimal>;

    /// Copy the commercial contents of `other` into this line.
    ///
    /// Copies the product, price, quantity, total, weight and volume. Identity,
    /// owning document, stock association and timestamps stay untouched.
    fn populate_by_document_item(&mut self, other: &dyn DocumentItem);
}
