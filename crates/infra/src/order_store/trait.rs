use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use flooring_core::{Entity, OrderNumber};
use flooring_orders::{Order, RecordParseError};

/// Order store operation error.
///
/// These are **infrastructure errors** (storage, parsing persisted data, record
/// lookups) as opposed to domain errors (validation, pricing invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O operation failed; `context` names the operation and path.
    #[error("persistence failure: {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// No record matches the requested identity.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A persisted line could not be decoded.
    #[error("malformed record at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: RecordParseError,
    },

    /// An edit tried to change the record's identity.
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn order_not_found(date: NaiveDate, order_number: OrderNumber) -> Self {
        Self::NotFound(format!("order {order_number} on {date}"))
    }
}

/// Date-partitioned order storage.
///
/// Every order belongs to exactly one date partition; order numbers are unique
/// across all partitions.
///
/// ## Contract
///
/// - `read_all` on a date with no partition returns an empty list.
/// - `edit`/`remove` target the record with the same order number **and** the
///   same value as the given order; every other record is left untouched.
///   No such record yields `StoreError::NotFound`.
/// - `generate_next_order_number` is `max + 1` over every partition, or 1.
///
/// ## Concurrency
///
/// Nothing serialises `generate_next_order_number` with the `append` that
/// follows it. Two callers interleaving those pairs can hand out the same
/// number. Implementations are single-writer by assumption.
pub trait OrderStore: Send + Sync {
    /// All orders for `date`, in stored order.
    fn read_all(&self, date: NaiveDate) -> Result<Vec<Order>, StoreError>;

    /// Append `order` to the partition for `date`, creating it if needed.
    fn append(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError>;

    /// Replace the record equal to `old` with `new`.
    fn edit(&self, date: NaiveDate, old: &Order, new: &Order) -> Result<(), StoreError>;

    /// Drop the record equal to `order`.
    fn remove(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError>;

    /// Every date that has a partition, oldest first.
    fn dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// One order by number within a date partition.
    fn get(&self, date: NaiveDate, order_number: OrderNumber) -> Result<Order, StoreError> {
        self.read_all(date)?
            .into_iter()
            .find(|o| o.order_number == order_number)
            .ok_or_else(|| StoreError::order_not_found(date, order_number))
    }

    /// Next unused order number across the whole store.
    fn generate_next_order_number(&self) -> Result<OrderNumber, StoreError> {
        let mut highest: Option<OrderNumber> = None;
        for date in self.dates()? {
            for order in self.read_all(date)? {
                highest = highest.max(Some(order.order_number));
            }
        }

        match highest {
            None => Ok(OrderNumber::FIRST),
            Some(n) => n.next().map_err(|e| StoreError::Storage(e.to_string())),
        }
    }
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn read_all(&self, date: NaiveDate) -> Result<Vec<Order>, StoreError> {
        (**self).read_all(date)
    }

    fn append(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        (**self).append(date, order)
    }

    fn edit(&self, date: NaiveDate, old: &Order, new: &Order) -> Result<(), StoreError> {
        (**self).edit(date, old, new)
    }

    fn remove(&self, date: NaiveDate, order: &Order) -> Result<(), StoreError> {
        (**self).remove(date, order)
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        (**self).dates()
    }

    fn get(&self, date: NaiveDate, order_number: OrderNumber) -> Result<Order, StoreError> {
        (**self).get(date, order_number)
    }

    fn generate_next_order_number(&self) -> Result<OrderNumber, StoreError> {
        (**self).generate_next_order_number()
    }
}

/// Reject edits that would change the record's order number.
pub(crate) fn ensure_same_identity(old: &Order, new: &Order) -> Result<(), StoreError> {
    if old.id() != new.id() {
        return Err(StoreError::InvalidEdit(format!(
            "order number cannot change ({} -> {})",
            old.order_number, new.order_number
        )));
    }
    Ok(())
}

/// Index of the record matching `target` by number and value.
pub(crate) fn locate<'a>(
    records: impl IntoIterator<Item = &'a Order>,
    target: &Order,
) -> Option<usize> {
    records
        .into_iter()
        .position(|o| o.id() == target.id() && o == target)
}
