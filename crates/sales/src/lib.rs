//! Sales orders and their line items.
//!
//! Line items carry two explicit lifecycle hooks that whatever persistence
//! layer is in use must call: [`OrderItem::before_persist`] right before every
//! insert or update, and [`OrderItem::after_first_persist`] right after the
//! first successful insert. The first reports whether the row is inserted or
//! updated; the second hands back the "creating" event the caller is expected
//! to publish, alongside the "saving" event from [`OrderItem::saved_event`].

pub mod order;
pub mod order_item;
pub mod reservation;

pub use order::Order;
pub use order_item::{NewOrderItem, OrderItem, OrderItemState, PersistKind};
pub use reservation::{
    ReservableItem, ReservableItemCreating, ReservableItemSaving, ReservationEvent,
    ReservationSnapshot,
};
