//! Keyed record storage abstractions.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use erpline_catalog::Product;
use erpline_core::{OrderId, OrderItemId, ProductId, WarehouseId};
use erpline_sales::{Order, OrderItem};
use erpline_stocks::Warehouse;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Insert of a key that is already present.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// Update of a key that is not present.
    #[error("missing record: {0}")]
    Missing(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Keyed record store. Each write is atomic for a single record only.
pub trait RecordStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, StoreError>;

    /// Add a new record; fails with `Duplicate` if `key` exists.
    fn insert(&self, key: K, value: V) -> Result<(), StoreError>;

    /// Replace an existing record; fails with `Missing` if `key` is absent.
    fn update(&self, key: K, value: V) -> Result<(), StoreError>;

    /// Physically remove a record, returning it if it existed.
    fn remove(&self, key: &K) -> Result<Option<V>, StoreError>;

    fn list(&self) -> Result<Vec<V>, StoreError>;
}

impl<K, V, S> RecordStore<K, V> for Arc<S>
where
    S: RecordStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        (**self).get(key)
    }

    fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        (**self).insert(key, value)
    }

    fn update(&self, key: K, value: V) -> Result<(), StoreError> {
        (**self).update(key, value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>, StoreError> {
        (**self).remove(key)
    }

    fn list(&self) -> Result<Vec<V>, StoreError> {
        (**self).list()
    }
}

/// In-memory record store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryRecordStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryRecordStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecordStore<K, V> for InMemoryRecordStore<K, V>
where
    K: Clone + Eq + Hash + core::fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{key:?}")));
        }
        map.insert(key, value);
        Ok(())
    }

    fn update(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        match map.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::Missing(format!("{key:?}"))),
        }
    }

    fn remove(&self, key: &K) -> Result<Option<V>, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map.remove(key))
    }

    fn list(&self) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }
}

/// The record stores the order item pipeline reads and writes.
#[derive(Clone)]
pub struct Records {
    pub items: Arc<dyn RecordStore<OrderItemId, OrderItem>>,
    pub orders: Arc<dyn RecordStore<OrderId, Order>>,
    pub products: Arc<dyn RecordStore<ProductId, Product>>,
    pub warehouses: Arc<dyn RecordStore<WarehouseId, Warehouse>>,
}

impl Records {
    pub fn in_memory() -> Self {
        Self {
            items: Arc::new(InMemoryRecordStore::new()),
            orders: Arc::new(InMemoryRecordStore::new()),
            products: Arc::new(InMemoryRecordStore::new()),
            warehouses: Arc::new(InMemoryRecordStore::new()),
        }
    }
}

impl core::fmt::Debug for Records {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Records").finish_non_exhaustive()
    }
}
