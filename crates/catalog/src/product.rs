use serde::{Deserialize, Serialize};

use erpline_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
}

impl Product {
    /// Build a product, trimming and validating `sku` and `name`.
    pub fn new(id: ProductId, sku: impl Into<String>, name: impl Into<String>) -> DomainResult<Self> {
        let sku = sku.into().trim().to_string();
        let name = name.into().trim().to_string();

        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self { id, sku, name })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
