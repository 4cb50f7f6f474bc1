use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use erpline_core::{Entity, ProductId, StockId, WarehouseId};

/// Stock/reservation record created for a document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    /// Document the reservation was made for.
    pub document_id: Uuid,
    /// Line the reservation was made for.
    pub item_id: Uuid,
    pub qty: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Entity for Stock {
    type Id = StockId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
