use serde::{Deserialize, Serialize};

use erpline_core::{DomainError, DomainResult, Entity, WarehouseId};

/// A warehouse documents operate in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
}

impl Warehouse {
    pub fn new(id: WarehouseId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        Ok(Self { id, name })
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
