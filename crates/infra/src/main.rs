//! Runs one order line through the persistence pipeline against in-memory
//! stores and logs what every listener on the bus would see.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use erpline_catalog::Product;
use erpline_core::{OrderId, OrderItemId, ProductId, WarehouseId};
use erpline_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};
use erpline_infra::{OrderItemRepository, PersistError, Records, RepositoryConfig};
use erpline_sales::{NewOrderItem, Order, OrderItem, ReservationEvent};
use erpline_stocks::{InMemoryStockRepository, Warehouse};

fn main() -> Result<(), PersistError> {
    erpline_observability::init();

    let config = RepositoryConfig::from_env();
    let records = Records::in_memory();

    let warehouse_id = WarehouseId::new();
    records
        .warehouses
        .insert(warehouse_id, Warehouse::new(warehouse_id, "Main")?)?;
    let product_id = ProductId::new();
    records
        .products
        .insert(product_id, Product::new(product_id, "SKU-1", "Widget")?)?;
    let order_id = OrderId::new();
    records.orders.insert(
        order_id,
        Order::new(order_id, "SO-1", warehouse_id, Utc::now())?,
    )?;

    let bus: Arc<InMemoryEventBus<EventEnvelope<ReservationEvent>>> =
        Arc::new(InMemoryEventBus::new());
    let sub = bus.subscribe();
    let repo = OrderItemRepository::with_config(
        records,
        Arc::new(InMemoryStockRepository::new()),
        bus,
        config,
    );

    let mut item = OrderItem::new(
        OrderItemId::new(),
        NewOrderItem::new(order_id, product_id, Decimal::new(1250, 2), Decimal::from(4)),
    );
    repo.save(&mut item)?;

    for envelope in sub.drain() {
        info!(
            event = envelope.payload().event_type(),
            entity_id = %envelope.entity_id(),
            "published"
        );
    }
    info!(
        item_id = %item.id_typed(),
        total = ?item.total(),
        stock_id = ?item.stock_id(),
        "order item saved"
    );
    Ok(())
}
