//! Event model and in-process publication.
//!
//! Events are published on a bus that the caller owns and passes in explicitly;
//! nothing in this crate is globally reachable.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
