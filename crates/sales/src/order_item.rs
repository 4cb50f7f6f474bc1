use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use erpline_core::{
    DocumentItem, DomainError, DomainResult, Entity, OrderId, OrderItemId, ProductId, SoftDeletes,
    StockId, Timestamps,
};
use erpline_stocks::{Stock, StockError, StockRepository};

use crate::order::Order;
use crate::reservation::{ReservableItem, ReservationEvent};

/// Observable lifecycle of an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderItemState {
    /// Never persisted.
    New,
    /// Persisted, total computed, no stock yet.
    Persisted,
    /// Persisted with its stock association established.
    Reserved,
}

/// What the persistence layer must do with an item after `before_persist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistKind {
    Insert,
    Update,
}

/// Input for a new order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub price: Decimal,
    pub qty: Decimal,
    /// Explicit line total. Left `None` (or zero) to have it computed.
    pub total: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub volume: Option<Decimal>,
}

impl NewOrderItem {
    pub fn new(order_id: OrderId, product_id: ProductId, price: Decimal, qty: Decimal) -> Self {
        Self {
            order_id,
            product_id,
            price,
            qty,
            total: None,
            weight: None,
            volume: None,
        }
    }
}

/// One line of a sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    product_id: ProductId,
    order_id: OrderId,
    stock_id: Option<StockId>,
    price: Decimal,
    qty: Decimal,
    total: Option<Decimal>,
    weight: Option<Decimal>,
    volume: Option<Decimal>,
    timestamps: Option<Timestamps>,
    #[serde(skip)]
    dirty: bool,
}

impl OrderItem {
    /// Entity type name used on published envelopes.
    pub const ENTITY_TYPE: &'static str = "sales.order_item";

    pub fn new(id: OrderItemId, input: NewOrderItem) -> Self {
        Self {
            id,
            product_id: input.product_id,
            order_id: input.order_id,
            stock_id: None,
            price: input.price,
            qty: input.qty,
            total: input.total,
            weight: input.weight,
            volume: input.volume,
            timestamps: None,
            dirty: true,
        }
    }

    /// An empty line (price, qty and total at zero) for `order_id`.
    pub fn empty(id: OrderItemId, order_id: OrderId, product_id: ProductId) -> Self {
        Self::new(
            id,
            NewOrderItem::new(order_id, product_id, Decimal::ZERO, Decimal::ZERO),
        )
    }

    pub fn id_typed(&self) -> OrderItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn stock_id(&self) -> Option<StockId> {
        self.stock_id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn qty(&self) -> Decimal {
        self.qty
    }

    pub fn total(&self) -> Option<Decimal> {
        self.total
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub fn volume(&self) -> Option<Decimal> {
        self.volume
    }

    pub fn timestamps(&self) -> Option<&Timestamps> {
        self.timestamps.as_ref()
    }

    pub fn state(&self) -> OrderItemState {
        match (&self.timestamps, self.stock_id) {
            (None, _) => OrderItemState::New,
            (Some(_), None) => OrderItemState::Persisted,
            (Some(_), Some(_)) => OrderItemState::Reserved,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.timestamps.is_some()
    }

    /// Whether the item has changes not yet written by the persistence layer.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_product(&mut self, product_id: ProductId) {
        self.product_id = product_id;
        self.dirty = true;
    }

    pub fn set_price(&mut self, price: Decimal) {
        self.price = price;
        self.dirty = true;
    }

    pub fn set_qty(&mut self, qty: Decimal) {
        self.qty = qty;
        self.dirty = true;
    }

    /// Set an explicit total. Zero counts as unset and is recomputed on persist.
    pub fn set_total(&mut self, total: Option<Decimal>) {
        self.total = total;
        self.dirty = true;
    }

    /// Drop the current total so the next persist recomputes it from price and qty.
    pub fn clear_total(&mut self) {
        self.set_total(None);
    }

    pub fn set_weight(&mut self, weight: Option<Decimal>) {
        self.weight = weight;
        self.dirty = true;
    }

    pub fn set_volume(&mut self, volume: Option<Decimal>) {
        self.volume = volume;
        self.dirty = true;
    }

    fn total_is_empty(&self) -> bool {
        self.total.is_none_or(|t| t.is_zero())
    }

    /// Set `total = price * qty` unless a non-zero total is already present.
    ///
    /// A product outside the decimal range leaves the total untouched.
    pub fn calculate_total(&mut self) {
        if self.total_is_empty() {
            if let Some(total) = self.price.checked_mul(self.qty) {
                self.total = Some(total);
            }
        }
    }

    /// Pre-persist hook; must run right before every insert or update.
    ///
    /// Computes the total and stamps the timestamps, then tells the caller
    /// whether the row must be inserted or updated. A line whose total would
    /// have to be computed but does not fit a decimal is rejected untouched.
    pub fn before_persist(&mut self, now: DateTime<Utc>) -> DomainResult<PersistKind> {
        if self.total_is_empty() && self.price.checked_mul(self.qty).is_none() {
            return Err(DomainError::validation(format!(
                "line total {} x {} is out of range",
                self.price, self.qty
            )));
        }
        self.calculate_total();

        if self.timestamps.is_none() {
            self.timestamps = Some(Timestamps::created(now));
            return Ok(PersistKind::Insert);
        }

        if self.dirty {
            if let Some(ts) = self.timestamps.as_mut() {
                ts.touch(now);
            }
        }
        Ok(PersistKind::Update)
    }

    /// Record that the persistence layer wrote the current state.
    pub fn mark_persisted(&mut self) {
        self.dirty = false;
    }

    /// Undo the effects of `before_persist` for an insert that did not stick.
    pub fn revert_to_new(&mut self) {
        self.timestamps = None;
        self.stock_id = None;
        self.dirty = true;
    }

    /// Take the stock association recorded on the stored row.
    ///
    /// A copy loaded before the row was reserved picks the stock id up. A copy
    /// naming a stock the row does not know is stale and rejected.
    pub fn adopt_stored_stock(&mut self, stored: Option<StockId>) -> DomainResult<()> {
        match (self.stock_id, stored) {
            (None, Some(stock_id)) => {
                self.stock_id = Some(stock_id);
                Ok(())
            }
            (Some(own), stored) if stored != Some(own) => Err(DomainError::conflict(format!(
                "order item {} holds stock {own} unknown to the stored row",
                self.id
            ))),
            _ => Ok(()),
        }
    }

    /// Drop a stock association that never reached the store.
    pub fn forget_stock(&mut self) {
        self.stock_id = None;
    }

    /// Ask `stocks` to create the stock record for this line and keep its id.
    ///
    /// Only valid once, on a persisted line of `order`.
    pub fn create_associated_stock<S>(
        &mut self,
        stocks: &S,
        order: &Order,
    ) -> Result<Stock, StockError>
    where
        S: StockRepository + ?Sized,
    {
        if !self.is_persisted() {
            return Err(
                DomainError::invariant("order item must be persisted before stock is created").into(),
            );
        }
        if self.stock_id.is_some() {
            return Err(DomainError::conflict("order item already has a stock record").into());
        }
        if order.id_typed() != self.order_id {
            return Err(DomainError::invariant("order item does not belong to order").into());
        }

        let stock = stocks.create_from_document_item(&*self, order)?;
        self.stock_id = Some(stock.id);
        self.dirty = true;
        Ok(stock)
    }

    /// Post-create hook; must run exactly once, right after the first insert.
    ///
    /// Establishes the stock association and returns the "creating" event.
    pub fn after_first_persist<S>(
        &mut self,
        stocks: &S,
        order: &Order,
        now: DateTime<Utc>,
    ) -> Result<(Stock, ReservationEvent), StockError>
    where
        S: StockRepository + ?Sized,
    {
        let stock = self.create_associated_stock(stocks, order)?;
        Ok((stock, ReservationEvent::creating(&*self, now)))
    }

    /// The "saving" event every successful persist emits.
    pub fn saved_event(&self, now: DateTime<Utc>) -> ReservationEvent {
        ReservationEvent::saving(self, now)
    }

    /// Flag the line as deleted. Fails on a line that was never persisted.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let ts = self
            .timestamps
            .as_mut()
            .ok_or(DomainError::not_found("order item"))?;
        ts.soft_delete(now);
        self.dirty = true;
        Ok(())
    }

    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let ts = self
            .timestamps
            .as_mut()
            .ok_or(DomainError::not_found("order item"))?;
        ts.restore(now);
        self.dirty = true;
        Ok(())
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SoftDeletes for OrderItem {
    fn timestamps(&self) -> Option<&Timestamps> {
        self.timestamps.as_ref()
    }
}

impl DocumentItem for OrderItem {
    fn item_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn document_id(&self) -> Uuid {
        *self.order_id.as_uuid()
    }

    fn product_id(&self) -> ProductId {
        self.product_id
    }

    fn stock_id(&self) -> Option<StockId> {
        self.stock_id
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn qty(&self) -> Decimal {
        self.qty
    }

    fn total(&self) -> Option<Decimal> {
        self.total
    }

    fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    fn volume(&self) -> Option<Decimal> {
        self.volume
    }

    fn populate_by_document_item(&mut self, other: &dyn DocumentItem) {
        self.product_id = other.product_id();
        self.price = other.price();
        self.qty = other.qty();
        self.total = other.total();
        self.weight = other.weight();
        self.volume = other.volume();
        self.dirty = true;
    }
}

impl ReservableItem for OrderItem {
    fn entity_type(&self) -> &'static str {
        Self::ENTITY_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use erpline_core::{Document, WarehouseId};
    use erpline_stocks::InMemoryStockRepository;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_order() -> Order {
        Order::new(OrderId::new(), "SO-1", WarehouseId::new(), test_time()).unwrap()
    }

    fn test_item(order: &Order, price: Decimal, qty: Decimal) -> OrderItem {
        OrderItem::new(
            OrderItemId::new(),
            NewOrderItem::new(order.id_typed(), ProductId::new(), price, qty),
        )
    }

    #[test]
    fn new_item_has_zero_defaults() {
        let order = test_order();
        let item = OrderItem::empty(OrderItemId::new(), order.id_typed(), ProductId::new());

        assert_eq!(item.price(), Decimal::ZERO);
        assert_eq!(item.qty(), Decimal::ZERO);
        assert_eq!(item.total(), None);
        assert_eq!(item.state(), OrderItemState::New);
        assert!(item.is_dirty());
    }

    #[test]
    fn calculate_total_multiplies_price_by_qty_when_unset() {
        let order = test_order();
        let mut item = test_item(&order, dec!(10.0), dec!(3));

        item.calculate_total();

        assert_eq!(item.total(), Some(dec!(30.0)));
    }

    #[test]
    fn calculate_total_keeps_explicit_total() {
        let order = test_order();
        let mut item = test_item(&order, dec!(10.0), dec!(3));
        item.set_total(Some(dec!(5.0)));

        item.calculate_total();

        assert_eq!(item.total(), Some(dec!(5.0)));
    }

    #[test]
    fn zero_total_counts_as_unset() {
        let order = test_order();
        let mut item = test_item(&order, dec!(2.5), dec!(4));
        item.set_total(Some(Decimal::ZERO));

        item.calculate_total();

        assert_eq!(item.total(), Some(dec!(10.0)));
    }

    #[test]
    fn computed_total_is_not_recomputed_after_price_change() {
        let order = test_order();
        let mut item = test_item(&order, dec!(10), dec!(3));
        let t0 = test_time();
        item.before_persist(t0).unwrap();

        item.set_price(dec!(20));
        item.before_persist(t0 + Duration::seconds(1)).unwrap();

        assert_eq!(item.total(), Some(dec!(30)));
    }

    #[test]
    fn clear_total_forces_recomputation() {
        let order = test_order();
        let mut item = test_item(&order, dec!(10), dec!(3));
        let t0 = test_time();
        item.before_persist(t0).unwrap();

        item.set_price(dec!(20));
        item.clear_total();
        item.before_persist(t0).unwrap();

        assert_eq!(item.total(), Some(dec!(60)));
    }

    #[test]
    fn before_persist_reports_insert_then_update() {
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        let t0 = test_time();

        assert_eq!(item.before_persist(t0), Ok(PersistKind::Insert));
        item.mark_persisted();
        assert_eq!(item.state(), OrderItemState::Persisted);
        assert_eq!(item.timestamps().unwrap().created_at, t0);

        item.set_qty(dec!(2));
        let t1 = t0 + Duration::seconds(30);
        assert_eq!(item.before_persist(t1), Ok(PersistKind::Update));
        assert_eq!(item.timestamps().unwrap().updated_at, t1);
        assert_eq!(item.timestamps().unwrap().created_at, t0);
    }

    #[test]
    fn clean_update_does_not_touch_updated_at() {
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        let t0 = test_time();
        item.before_persist(t0).unwrap();
        item.mark_persisted();

        item.before_persist(t0 + Duration::seconds(5)).unwrap();

        assert_eq!(item.timestamps().unwrap().updated_at, t0);
    }

    #[test]
    fn after_first_persist_associates_stock_and_emits_creating() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut item = test_item(&order, dec!(10), dec!(3));
        let now = test_time();
        item.before_persist(now).unwrap();

        let (stock, event) = item.after_first_persist(&stocks, &order, now).unwrap();

        assert_eq!(item.stock_id(), Some(stock.id));
        assert_eq!(item.state(), OrderItemState::Reserved);
        assert_eq!(stock.warehouse_id, order.warehouse_id());
        assert!(event.is_creating());
        assert_eq!(event.item().stock_id, Some(stock.id));
        assert_eq!(event.item().total, Some(dec!(30)));
    }

    #[test]
    fn stock_cannot_be_created_before_persisting() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));

        let err = item.create_associated_stock(&stocks, &order).unwrap_err();

        match err {
            StockError::Domain(DomainError::InvariantViolation(_)) => {}
            other => panic!("Expected invariant violation, got {other:?}"),
        }
        assert!(stocks.is_empty());
    }

    #[test]
    fn stock_is_created_only_once() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        item.before_persist(test_time()).unwrap();
        item.create_associated_stock(&stocks, &order).unwrap();

        let err = item.create_associated_stock(&stocks, &order).unwrap_err();

        match err {
            StockError::Domain(DomainError::Conflict(_)) => {}
            other => panic!("Expected conflict, got {other:?}"),
        }
        assert_eq!(stocks.len(), 1);
    }

    #[test]
    fn stock_for_foreign_order_is_rejected() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let other = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        item.before_persist(test_time()).unwrap();

        let err = item.create_associated_stock(&stocks, &other).unwrap_err();

        assert!(matches!(err, StockError::Domain(DomainError::InvariantViolation(_))));
        assert_eq!(item.stock_id(), None);
    }

    #[test]
    fn populate_copies_commercial_fields_only() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut source = test_item(&order, dec!(7.5), dec!(2));
        source.set_total(Some(dec!(14)));
        source.set_weight(Some(dec!(1.2)));
        source.set_volume(Some(dec!(0.3)));
        source.before_persist(test_time()).unwrap();
        source.create_associated_stock(&stocks, &order).unwrap();

        let target_order = test_order();
        let mut target = OrderItem::empty(OrderItemId::new(), target_order.id_typed(), ProductId::new());
        target.populate_by_document_item(&source);

        assert_eq!(target.product_id(), source.product_id());
        assert_eq!(target.price(), dec!(7.5));
        assert_eq!(target.qty(), dec!(2));
        assert_eq!(target.total(), Some(dec!(14)));
        assert_eq!(target.weight(), Some(dec!(1.2)));
        assert_eq!(target.volume(), Some(dec!(0.3)));

        assert_eq!(target.order_id(), target_order.id_typed());
        assert_eq!(target.stock_id(), None);
        assert_eq!(target.state(), OrderItemState::New);
    }

    #[test]
    fn soft_delete_requires_persisted_item() {
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        assert_eq!(
            item.soft_delete(test_time()),
            Err(DomainError::NotFound("order item"))
        );

        item.before_persist(test_time()).unwrap();
        item.soft_delete(test_time()).unwrap();
        assert!(item.is_trashed());

        item.restore(test_time()).unwrap();
        assert!(!item.is_trashed());
    }

    #[test]
    fn out_of_range_total_is_rejected_before_persisting() {
        let order = test_order();
        let huge = Decimal::from(1_000_000_000_000_000i64);
        let mut item = test_item(&order, huge, huge);

        item.calculate_total();
        assert_eq!(item.total(), None);

        match item.before_persist(test_time()) {
            Err(DomainError::Validation(_)) => {}
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert_eq!(item.state(), OrderItemState::New);

        // An explicit total needs no multiplication.
        item.set_total(Some(dec!(1)));
        assert_eq!(item.before_persist(test_time()), Ok(PersistKind::Insert));
        assert_eq!(item.total(), Some(dec!(1)));
    }

    #[test]
    fn stale_copy_adopts_stored_stock() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        item.before_persist(test_time()).unwrap();
        let mut stale = item.clone();
        let stock = item.create_associated_stock(&stocks, &order).unwrap();

        stale.adopt_stored_stock(Some(stock.id)).unwrap();
        assert_eq!(stale.stock_id(), Some(stock.id));
        assert_eq!(stale.state(), OrderItemState::Reserved);

        let err = item.adopt_stored_stock(None).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(item.adopt_stored_stock(Some(stock.id)), Ok(()));
    }

    #[test]
    fn revert_to_new_forgets_persistence() {
        let stocks = InMemoryStockRepository::new();
        let order = test_order();
        let mut item = test_item(&order, dec!(1), dec!(1));
        item.before_persist(test_time()).unwrap();
        item.create_associated_stock(&stocks, &order).unwrap();

        item.revert_to_new();

        assert_eq!(item.state(), OrderItemState::New);
        assert_eq!(item.stock_id(), None);
        assert_eq!(item.total(), Some(dec!(1)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn decimal(cents: u32) -> Decimal {
            Decimal::new(cents as i64, 2)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: with no explicit total, persisting yields price * qty.
            #[test]
            fn unset_total_becomes_price_times_qty(price in 0u32..10_000_000, qty in 0u32..100_000) {
                let order = test_order();
                let mut item = test_item(&order, decimal(price), decimal(qty));

                item.before_persist(Utc::now()).unwrap();

                prop_assert_eq!(item.total(), Some(decimal(price) * decimal(qty)));
            }

            /// Property: a non-zero explicit total survives any price/qty.
            #[test]
            fn explicit_total_is_preserved(
                price in 0u32..10_000_000,
                qty in 0u32..100_000,
                total in 1u32..10_000_000
            ) {
                let order = test_order();
                let mut item = test_item(&order, decimal(price), decimal(qty));
                item.set_total(Some(decimal(total)));

                item.before_persist(Utc::now()).unwrap();
                item.before_persist(Utc::now()).unwrap();

                prop_assert_eq!(item.total(), Some(decimal(total)));
            }
        }
    }
}
