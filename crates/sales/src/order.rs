use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use erpline_core::{AggregateRoot, Document, DomainError, DomainResult, OrderId, Timestamps, WarehouseId};

/// Aggregate root: sales order.
///
/// Only the parts line items depend on are modelled here: the warehouse the
/// order ships from, and the modification stamp that every line change bumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    number: String,
    warehouse_id: WarehouseId,
    timestamps: Timestamps,
    version: u64,
}

impl Order {
    pub fn new(
        id: OrderId,
        number: impl Into<String>,
        warehouse_id: WarehouseId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(DomainError::validation("order number cannot be empty"));
        }

        Ok(Self {
            id,
            number,
            warehouse_id,
            timestamps: Timestamps::created(now),
            version: 1,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    /// Mark the order as modified (one of its lines changed).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.timestamps.touch(now);
        self.version += 1;
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Document for Order {
    fn document_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }
}
