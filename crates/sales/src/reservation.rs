//! Reservable items and the notifications their persistence emits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use erpline_core::{DocumentItem, ProductId, StockId, ValueObject};
use erpline_events::Event;

/// Point-in-time view of a reservable line, carried by reservation events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    pub item_id: Uuid,
    pub document_id: Uuid,
    pub product_id: ProductId,
    pub stock_id: Option<StockId>,
    pub price: Decimal,
    pub qty: Decimal,
    pub total: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub volume: Option<Decimal>,
}

impl ValueObject for ReservationSnapshot {}

/// A document line whose persistence triggers inventory reservation side effects.
pub trait ReservableItem: DocumentItem {
    /// Stable name of the line type (e.g. "sales.order_item").
    fn entity_type(&self) -> &'static str;

    fn reservation_snapshot(&self) -> ReservationSnapshot {
        ReservationSnapshot {
            item_id: self.item_id(),
            document_id: self.document_id(),
            product_id: self.product_id(),
            stock_id: self.stock_id(),
            price: self.price(),
            qty: self.qty(),
            total: self.total(),
            weight: self.weight(),
            volume: self.volume(),
        }
    }
}

/// Event: a reservable item was persisted for the first time and got its stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservableItemCreating {
    pub item: ReservationSnapshot,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a reservable item was persisted (insert or update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservableItemSaving {
    pub item: ReservationSnapshot,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationEvent {
    Creating(ReservableItemCreating),
    Saving(ReservableItemSaving),
}

impl ReservationEvent {
    pub fn creating(item: &dyn ReservableItem, occurred_at: DateTime<Utc>) -> Self {
        ReservationEvent::Creating(ReservableItemCreating {
            item: item.reservation_snapshot(),
            occurred_at,
        })
    }

    pub fn saving(item: &dyn ReservableItem, occurred_at: DateTime<Utc>) -> Self {
        ReservationEvent::Saving(ReservableItemSaving {
            item: item.reservation_snapshot(),
            occurred_at,
        })
    }

    pub fn item(&self) -> &ReservationSnapshot {
        match self {
            ReservationEvent::Creating(e) => &e.item,
            ReservationEvent::Saving(e) => &e.item,
        }
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, ReservationEvent::Creating(_))
    }
}

impl Event for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReservationEvent::Creating(_) => "sales.order_item.reservable_creating",
            ReservationEvent::Saving(_) => "sales.order_item.reservable_saving",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReservationEvent::Creating(e) => e.occurred_at,
            ReservationEvent::Saving(e) => e.occurred_at,
        }
    }
}
