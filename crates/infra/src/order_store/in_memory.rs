use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use flooring_orders::Order;

use super::r#trait::{OrderStore, StoreError, ensure_same_identity, locate};

/// In-memory order store.
///
/// Intended for tests/dev. Follows the same contract as the file store,
/// including keeping a partition around after its last order is removed.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    partitions: RwLock<BTreeMap<NaiveDate, Vec<Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Storage("lock poisoned".to_string())
    }
}

impl OrderStore for InMemoryOrderStore {
    fn read_all(&self, date: NaiveDate) -> Result<Vec<Order>, StoreError> {
        let partitions = self.partitions.read().map_err(|_| Self::poisoned())?;
        Ok(partitions.get(&date).cloned().unwrap_or_default())
    }

    fn append(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().map_err(|_| Self::poisoned())?;
        partitions.entry(date).or_default().push(order.clone());
        Ok(())
    }

    fn edit(&self, date: NaiveDate, old: &Order, new: &Order) -> Result<(), StoreError> {
        ensure_same_identity(old, new)?;
        let mut partitions = self.partitions.write().map_err(|_| Self::poisoned())?;
        let orders = partitions
            .get_mut(&date)
            .ok_or_else(|| StoreError::order_not_found(date, old.order_number))?;
        let idx = locate(orders.iter(), old)
            .ok_or_else(|| StoreError::order_not_found(date, old.order_number))?;
        orders[idx] = new.clone();
        Ok(())
    }

    fn remove(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().map_err(|_| Self::poisoned())?;
        let orders = partitions
            .get_mut(&date)
            .ok_or_else(|| StoreError::order_not_found(date, order.order_number))?;
        let idx = locate(orders.iter(), order)
            .ok_or_else(|| StoreError::order_not_found(date, order.order_number))?;
        orders.remove(idx);
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let partitions = self.partitions.read().map_err(|_| Self::poisoned())?;
        Ok(partitions.keys().copied().collect())
    }
}
