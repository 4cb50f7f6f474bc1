//! Eager-loaded view of an order item and the records it points at.

use erpline_catalog::Product;
use erpline_sales::{Order, OrderItem};
use erpline_stocks::{Stock, Warehouse};

/// An order item together with its product, owning order, the order's
/// warehouse and, once reserved, its stock record.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRelations {
    item: OrderItem,
    product: Product,
    document: Order,
    warehouse: Warehouse,
    stock: Option<Stock>,
}

impl OrderItemRelations {
    pub fn new(
        item: OrderItem,
        product: Product,
        document: Order,
        warehouse: Warehouse,
        stock: Option<Stock>,
    ) -> Self {
        Self {
            item,
            product,
            document,
            warehouse,
            stock,
        }
    }

    pub fn item(&self) -> &OrderItem {
        &self.item
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Stock record; `None` until the item has been reserved.
    pub fn stock(&self) -> Option<&Stock> {
        self.stock.as_ref()
    }

    /// The owning document.
    pub fn document(&self) -> &Order {
        &self.document
    }

    pub fn order(&self) -> &Order {
        self.document()
    }

    /// Warehouse of the owning document.
    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn into_item(self) -> OrderItem {
        self.item
    }
}
