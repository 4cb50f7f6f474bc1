//! Stock creation collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use erpline_core::{Document, DocumentItem, DomainError, StockId};

use crate::stock::Stock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// The document line cannot be reserved as-is.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing storage refused the operation.
    #[error("stock storage unavailable: {0}")]
    Unavailable(String),
}

/// Creates and looks up stock records on behalf of document lines.
pub trait StockRepository: Send + Sync {
    /// Create the stock record for `item`, which belongs to `document`.
    ///
    /// Fails with `DomainError::Conflict` if the line already has a stock record.
    fn create_from_document_item(
        &self,
        item: &dyn DocumentItem,
        document: &dyn Document,
    ) -> Result<Stock, StockError>;

    fn get(&self, id: StockId) -> Result<Option<Stock>, StockError>;

    /// Remove a stock record (compensation for a failed line insert).
    fn remove(&self, id: StockId) -> Result<(), StockError>;
}

impl<S> StockRepository for Arc<S>
where
    S: StockRepository + ?Sized,
{
    fn create_from_document_item(
        &self,
        item: &dyn DocumentItem,
        document: &dyn Document,
    ) -> Result<Stock, StockError> {
        (**self).create_from_document_item(item, document)
    }

    fn get(&self, id: StockId) -> Result<Option<Stock>, StockError> {
        (**self).get(id)
    }

    fn remove(&self, id: StockId) -> Result<(), StockError> {
        (**self).remove(id)
    }
}

/// In-memory stock repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockRepository {
    stocks: RwLock<HashMap<StockId, Stock>>,
}

impl InMemoryStockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Stock> {
        match self.stocks.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.stocks.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StockRepository for InMemoryStockRepository {
    fn create_from_document_item(
        &self,
        item: &dyn DocumentItem,
        document: &dyn Document,
    ) -> Result<Stock, StockError> {
        if item.document_id() != document.document_id() {
            return Err(DomainError::invariant("item does not belong to document").into());
        }
        if item.stock_id().is_some() {
            return Err(DomainError::conflict("item already has a stock record").into());
        }
        if item.qty() < Decimal::ZERO {
            return Err(DomainError::validation("cannot reserve a negative quantity").into());
        }

        let mut stocks = self
            .stocks
            .write()
            .map_err(|_| StockError::Unavailable("lock poisoned".to_string()))?;

        let item_id = item.item_id();
        if stocks.values().any(|s| s.item_id == item_id) {
            return Err(DomainError::conflict("item already has a stock record").into());
        }

        let stock = Stock {
            id: StockId::new(),
            product_id: item.product_id(),
            warehouse_id: document.warehouse_id(),
            document_id: document.document_id(),
            item_id,
            qty: item.qty(),
            created_at: Utc::now(),
        };
        stocks.insert(stock.id, stock.clone());

        debug!(stock_id = %stock.id, %item_id, "stock created for document item");
        Ok(stock)
    }

    fn get(&self, id: StockId) -> Result<Option<Stock>, StockError> {
        let stocks = self
            .stocks
            .read()
            .map_err(|_| StockError::Unavailable("lock poisoned".to_string()))?;
        Ok(stocks.get(&id).cloned())
    }

    fn remove(&self, id: StockId) -> Result<(), StockError> {
        let mut stocks = self
            .stocks
            .write()
            .map_err(|_| StockError::Unavailable("lock poisoned".to_string()))?;
        stocks.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpline_core::{ProductId, WarehouseId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct Header {
        id: Uuid,
        warehouse_id: WarehouseId,
    }

    impl Document for Header {
        fn document_id(&self) -> Uuid {
            self.id
        }

        fn warehouse_id(&self) -> WarehouseId {
            self.warehouse_id
        }
    }

    struct Line {
        id: Uuid,
        document_id: Uuid,
        product_id: ProductId,
        stock_id: Option<StockId>,
        qty: Decimal,
    }

    impl DocumentItem for Line {
        fn item_id(&self) -> Uuid {
            self.id
        }

        fn document_id(&self) -> Uuid {
            self.document_id
        }

        fn product_id(&self) -> ProductId {
            self.product_id
        }

        fn stock_id(&self) -> Option<StockId> {
            self.stock_id
        }

        fn price(&self) -> Decimal {
            Decimal::ZERO
        }

        fn qty(&self) -> Decimal {
            self.qty
        }

        fn total(&self) -> Option<Decimal> {
            None
        }

        fn weight(&self) -> Option<Decimal> {
            None
        }

        fn volume(&self) -> Option<Decimal> {
            None
        }

        fn populate_by_document_item(&mut self, other: &dyn DocumentItem) {
            self.product_id = other.product_id();
            self.qty = other.qty();
        }
    }

    fn fixture(qty: Decimal) -> (Header, Line) {
        let header = Header {
            id: Uuid::now_v7(),
            warehouse_id: WarehouseId::new(),
        };
        let line = Line {
            id: Uuid::now_v7(),
            document_id: header.id,
            product_id: ProductId::new(),
            stock_id: None,
            qty,
        };
        (header, line)
    }

    #[test]
    fn creates_stock_in_document_warehouse() {
        let repo = InMemoryStockRepository::new();
        let (header, line) = fixture(dec!(3));

        let stock = repo.create_from_document_item(&line, &header).unwrap();

        assert_eq!(stock.warehouse_id, header.warehouse_id);
        assert_eq!(stock.product_id, line.product_id);
        assert_eq!(stock.item_id, line.id);
        assert_eq!(stock.qty, dec!(3));
        assert_eq!(repo.get(stock.id).unwrap(), Some(stock));
    }

    #[test]
    fn second_stock_for_same_item_is_a_conflict() {
        let repo = InMemoryStockRepository::new();
        let (header, line) = fixture(dec!(1));

        repo.create_from_document_item(&line, &header).unwrap();
        let err = repo.create_from_document_item(&line, &header).unwrap_err();

        match err {
            StockError::Domain(DomainError::Conflict(_)) => {}
            other => panic!("Expected conflict, got {other:?}"),
        }
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn item_from_other_document_is_rejected() {
        let repo = InMemoryStockRepository::new();
        let (_, line) = fixture(dec!(1));
        let (other_header, _) = fixture(dec!(1));

        let err = repo.create_from_document_item(&line, &other_header).unwrap_err();
        match err {
            StockError::Domain(DomainError::InvariantViolation(_)) => {}
            other => panic!("Expected invariant violation, got {other:?}"),
        }
        assert!(repo.is_empty());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let repo = InMemoryStockRepository::new();
        let (header, line) = fixture(dec!(-2));

        let err = repo.create_from_document_item(&line, &header).unwrap_err();
        assert!(matches!(err, StockError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn remove_deletes_the_record() {
        let repo = InMemoryStockRepository::new();
        let (header, line) = fixture(dec!(1));
        let stock = repo.create_from_document_item(&line, &header).unwrap();

        repo.remove(stock.id).unwrap();

        assert_eq!(repo.get(stock.id).unwrap(), None);
    }
}
