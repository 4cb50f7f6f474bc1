//! Order item persistence pipeline.
//!
//! `OrderItemRepository` is where the explicit lifecycle hooks of
//! [`OrderItem`] are invoked, in this order:
//!
//! ```text
//! save(item)
//!   ↓
//! 1. Resolve owning order and product (NotFound if missing); for an
//!    update, the stored row too (NotFound if missing or soft-deleted),
//!    whose stock association the caller's copy adopts
//!   ↓
//! 2. item.before_persist()            → total checked and computed, timestamps stamped
//!   ↓
//! 3. Insert or update the row
//!   ↓
//! 4. First insert only: item.after_first_persist()
//!      → stock created, stock id written back, "creating" event
//!   ↓
//! 5. Touch the owning order
//!   ↓
//! 6. Publish "creating" (first insert only), then "saving"
//! ```
//!
//! Total calculation cannot fail. Stock creation and publication failures are
//! returned to the caller unchanged; nothing is retried.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use erpline_catalog::Product;
use erpline_core::{Document, DocumentItem, DomainError, OrderId, OrderItemId, SoftDeletes};
use erpline_events::{EventBus, EventEnvelope};
use erpline_sales::{Order, OrderItem, PersistKind, ReservableItem, ReservationEvent};
use erpline_stocks::{Stock, StockError, StockRepository};

use crate::config::RepositoryConfig;
use crate::record_store::{Records, StoreError};
use crate::relations::OrderItemRelations;

#[derive(Debug, Error)]
pub enum PersistError {
    /// A referenced record does not exist, or the item was soft-deleted.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation is not valid for the item's current state.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The stock collaborator failed.
    #[error("stock creation failed: {0}")]
    Stock(#[from] StockError),

    /// Writing or reading a record failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The row was written but an event could not be published.
    #[error("event publication failed: {0}")]
    Publish(String),
}

/// Persists order items and runs their lifecycle side effects.
///
/// The event bus is owned by the caller; every listener interested in
/// reservation changes subscribes to it before handing it over.
#[derive(Debug)]
pub struct OrderItemRepository<S, B> {
    records: Records,
    stocks: S,
    bus: B,
    config: RepositoryConfig,
}

impl<S, B> OrderItemRepository<S, B> {
    pub fn new(records: Records, stocks: S, bus: B) -> Self {
        Self::with_config(records, stocks, bus, RepositoryConfig::default())
    }

    pub fn with_config(records: Records, stocks: S, bus: B, config: RepositoryConfig) -> Self {
        Self {
            records,
            stocks,
            bus,
            config,
        }
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn stocks(&self) -> &S {
        &self.stocks
    }

    pub fn config(&self) -> RepositoryConfig {
        self.config
    }
}

impl<S, B> OrderItemRepository<S, B>
where
    S: StockRepository,
    B: EventBus<EventEnvelope<ReservationEvent>>,
{
    /// Insert or update `item`, running every lifecycle hook.
    ///
    /// On success `item` reflects the stored row (computed total, timestamps,
    /// stock association).
    pub fn save(&self, item: &mut OrderItem) -> Result<(), PersistError> {
        let now = Utc::now();
        let mut order = self.load_order(item.order_id())?;
        self.load_product(item)?;
        let id = item.id_typed();

        if item.is_persisted() {
            let stored = self
                .get(id)?
                .ok_or_else(|| PersistError::NotFound(format!("order item {id}")))?;
            item.adopt_stored_stock(stored.stock_id())?;
        }

        let kind = item.before_persist(now)?;

        let creating = match kind {
            PersistKind::Insert => {
                if let Err(e) = self.records.items.insert(id, stored_row(item)) {
                    item.revert_to_new();
                    return Err(e.into());
                }
                item.mark_persisted();
                debug!(item_id = %id, order_id = %order.id_typed(), "order item inserted");

                Some(self.reserve_after_insert(item, &order, now)?)
            }
            PersistKind::Update => {
                self.records.items.update(id, stored_row(item))?;
                item.mark_persisted();
                debug!(item_id = %id, "order item updated");
                None
            }
        };

        self.touch_order(&mut order, now)?;

        if let Some(event) = creating {
            self.publish(item, event)?;
        }
        self.publish(item, item.saved_event(now))
    }

    /// Soft-delete the item and mark its order as modified.
    pub fn delete(&self, id: OrderItemId) -> Result<(), PersistError> {
        let now = Utc::now();
        let mut item = self
            .get(id)?
            .ok_or_else(|| PersistError::NotFound(format!("order item {id}")))?;
        let mut order = self.load_order(item.order_id())?;

        item.soft_delete(now)?;
        self.records.items.update(id, stored_row(&item))?;
        self.touch_order(&mut order, now)?;

        info!(item_id = %id, "order item soft-deleted");
        Ok(())
    }

    /// Undo a soft delete.
    pub fn restore(&self, id: OrderItemId) -> Result<OrderItem, PersistError> {
        let now = Utc::now();
        let mut item = self
            .get_with_trashed(id)?
            .ok_or_else(|| PersistError::NotFound(format!("order item {id}")))?;
        if !item.is_trashed() {
            return Ok(item);
        }
        let mut order = self.load_order(item.order_id())?;

        item.restore(now)?;
        self.records.items.update(id, stored_row(&item))?;
        item.mark_persisted();
        self.touch_order(&mut order, now)?;

        info!(item_id = %id, "order item restored");
        Ok(item)
    }

    /// Create the stock record for a persisted item that has none.
    ///
    /// Only reachable when an earlier insert failed to reserve and rollback
    /// was disabled. Emits the same events as a first insert.
    pub fn reserve_missing(&self, id: OrderItemId) -> Result<Stock, PersistError> {
        let now = Utc::now();
        let mut item = self
            .get(id)?
            .ok_or_else(|| PersistError::NotFound(format!("order item {id}")))?;
        let mut order = self.load_order(item.order_id())?;

        let (stock, creating) = item.after_first_persist(&self.stocks, &order, now)?;
        self.write_stock_association(&mut item, &stock)?;
        self.touch_order(&mut order, now)?;

        self.publish(&item, creating)?;
        self.publish(&item, item.saved_event(now))?;
        Ok(stock)
    }

    /// The item, unless missing or soft-deleted.
    pub fn get(&self, id: OrderItemId) -> Result<Option<OrderItem>, PersistError> {
        Ok(self.get_with_trashed(id)?.filter(|item| !item.is_trashed()))
    }

    /// The item, including soft-deleted ones.
    pub fn get_with_trashed(&self, id: OrderItemId) -> Result<Option<OrderItem>, PersistError> {
        Ok(self.records.items.get(&id)?)
    }

    /// Live items of an order, oldest first.
    pub fn list_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, PersistError> {
        let mut items: Vec<OrderItem> = self
            .records
            .items
            .list()?
            .into_iter()
            .filter(|item| item.order_id() == order_id && !item.is_trashed())
            .collect();
        items.sort_by_key(|item| {
            (
                item.timestamps().map(|ts| ts.created_at),
                *item.id_typed().as_uuid(),
            )
        });
        Ok(items)
    }

    /// Load the item with its document, product, warehouse and stock.
    pub fn load(&self, id: OrderItemId) -> Result<OrderItemRelations, PersistError> {
        let item = self
            .get(id)?
            .ok_or_else(|| PersistError::NotFound(format!("order item {id}")))?;
        let order = self.load_order(item.order_id())?;
        let product = self.load_product(&item)?;

        let warehouse_id = order.warehouse_id();
        let warehouse = self
            .records
            .warehouses
            .get(&warehouse_id)?
            .ok_or_else(|| PersistError::NotFound(format!("warehouse {warehouse_id}")))?;

        let stock = match item.stock_id() {
            Some(stock_id) => Some(
                self.stocks
                    .get(stock_id)?
                    .ok_or_else(|| PersistError::NotFound(format!("stock {stock_id}")))?,
            ),
            None => None,
        };

        Ok(OrderItemRelations::new(item, product, order, warehouse, stock))
    }

    fn load_order(&self, id: OrderId) -> Result<Order, PersistError> {
        self.records
            .orders
            .get(&id)?
            .ok_or_else(|| PersistError::NotFound(format!("order {id}")))
    }

    fn load_product(&self, item: &OrderItem) -> Result<Product, PersistError> {
        let product_id = item.product_id();
        self.records
            .products
            .get(&product_id)?
            .ok_or_else(|| PersistError::NotFound(format!("product {product_id}")))
    }

    /// Post-insert step: create the stock and write its id back.
    ///
    /// On failure the insert is undone when configured to.
    fn reserve_after_insert(
        &self,
        item: &mut OrderItem,
        order: &Order,
        now: DateTime<Utc>,
    ) -> Result<ReservationEvent, PersistError> {
        let id = item.id_typed();

        let (stock, creating) = match item.after_first_persist(&self.stocks, order, now) {
            Ok(created) => created,
            Err(e) => {
                warn!(item_id = %id, error = %e, "stock creation failed for new order item");
                if self.config.rollback_on_stock_failure {
                    self.rollback_insert(item);
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self.write_stock_association(item, &stock) {
            warn!(item_id = %id, stock_id = %stock.id, error = %e, "could not store stock association");
            if let Err(remove_err) = self.stocks.remove(stock.id) {
                warn!(stock_id = %stock.id, error = %remove_err, "orphaned stock record");
            }
            if self.config.rollback_on_stock_failure {
                self.rollback_insert(item);
            } else {
                item.forget_stock();
            }
            return Err(e);
        }

        Ok(creating)
    }

    fn write_stock_association(
        &self,
        item: &mut OrderItem,
        stock: &Stock,
    ) -> Result<(), PersistError> {
        self.records.items.update(item.id_typed(), stored_row(item))?;
        item.mark_persisted();
        debug!(item_id = %item.id_typed(), stock_id = %stock.id, "stock associated");
        Ok(())
    }

    fn rollback_insert(&self, item: &mut OrderItem) {
        let id = item.id_typed();
        match self.records.items.remove(&id) {
            Ok(_) => info!(item_id = %id, "order item insert rolled back"),
            Err(e) => warn!(item_id = %id, error = %e, "order item rollback failed"),
        }
        item.revert_to_new();
    }

    fn touch_order(&self, order: &mut Order, now: DateTime<Utc>) -> Result<(), PersistError> {
        order.touch(now);
        self.records.orders.update(order.id_typed(), order.clone())?;
        Ok(())
    }

    fn publish(&self, item: &OrderItem, event: ReservationEvent) -> Result<(), PersistError> {
        let envelope = EventEnvelope::wrap(item.item_id(), item.entity_type(), event);
        self.bus
            .publish(envelope)
            .map_err(|e| PersistError::Publish(e.to_string()))
    }
}

/// The row as written to the store: a clean copy of `item`.
fn stored_row(item: &OrderItem) -> OrderItem {
    let mut row = item.clone();
    row.mark_persisted();
    row
}
