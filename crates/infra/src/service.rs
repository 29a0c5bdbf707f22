//! Order service: the operations exposed to the presentation layer.
//!
//! Composes the catalogs, the pricing calculator, an `OrderStore` and an
//! `AuditSink`. All collaborators are passed in explicitly; catalogs are
//! reloaded from their files on every call.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use flooring_catalog::{
    CatalogError, Product, State, find_product, find_state, read_products, read_tax_table,
    state_codes,
};
use flooring_core::{DomainError, OrderNumber};
use flooring_orders::{Order, PricedOrder, compute_order, reprice};

use crate::audit::AuditSink;
use crate::config::AppConfig;
use crate::export::{ExportSummary, export_all};
use crate::order_store::{OrderStore, StoreError};

/// Smallest order the business accepts, in square feet.
pub const MINIMUM_AREA: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A product type or state code is not in its catalog.
    #[error("{0} not found")]
    NotFound(String),
}

impl ServiceError {
    /// True for every "no such record" outcome (order, product or state).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::Store(StoreError::NotFound(_))
        )
    }
}

/// Changes to apply to an existing order; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderEdit {
    pub customer_name: Option<String>,
    pub state: Option<String>,
    pub product_type: Option<String>,
    pub area: Option<Decimal>,
}

#[derive(Debug)]
pub struct OrderService<S, A> {
    config: AppConfig,
    store: S,
    audit: A,
}

impl<S, A> OrderService<S, A> {
    pub fn new(config: AppConfig, store: S, audit: A) -> Self {
        Self {
            config,
            store,
            audit,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (S, A) {
        (self.store, self.audit)
    }
}

impl<S, A> OrderService<S, A>
where
    S: OrderStore,
    A: AuditSink,
{
    pub fn get_order(&self, order_number: OrderNumber, date: NaiveDate) -> Result<Order, ServiceError> {
        Ok(self.store.get(date, order_number)?)
    }

    /// Orders for `date`; empty when nothing was ever stored for that date.
    pub fn get_all_orders(&self, date: NaiveDate) -> Result<Vec<Order>, ServiceError> {
        Ok(self.store.read_all(date)?)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(read_products(&self.config.products_file)?)
    }

    pub fn list_state_codes(&self) -> Result<Vec<String>, ServiceError> {
        Ok(state_codes(&read_tax_table(&self.config.taxes_file)?))
    }

    /// Price a new order. Nothing is persisted and no number is assigned.
    pub fn create_order(
        &self,
        customer_name: &str,
        state_code: &str,
        product_type: &str,
        area: Decimal,
    ) -> Result<PricedOrder, ServiceError> {
        ensure_minimum_area(area)?;
        let (product, state) = self.resolve(product_type, state_code)?;
        Ok(compute_order(
            customer_name,
            state_code,
            product_type,
            area,
            &product,
            &state,
        )?)
    }

    /// Assign the next order number and append the order to `date`.
    ///
    /// Once the append succeeds the order is returned even if the audit entry
    /// cannot be written; that failure is logged instead.
    pub fn persist_new_order(
        &self,
        date: NaiveDate,
        priced: PricedOrder,
    ) -> Result<Order, ServiceError> {
        let order_number = self.store.generate_next_order_number()?;
        let order = priced.assign(order_number);
        self.store.append(date, &order)?;

        info!(%order_number, %date, total = %order.total, "order created");
        self.record(&format!("Order {order_number} created for {date}."));
        Ok(order)
    }

    /// Re-price `original` with `edit` applied. Nothing is persisted.
    ///
    /// The area minimum applies only to a newly supplied area, so orders stored
    /// below it can still have other fields changed.
    pub fn create_edited_order(
        &self,
        original: &Order,
        edit: OrderEdit,
    ) -> Result<Order, ServiceError> {
        let customer_name = edit
            .customer_name
            .unwrap_or_else(|| original.customer_name.clone());
        let state_code = edit.state.unwrap_or_else(|| original.state.clone());
        let product_type = edit
            .product_type
            .unwrap_or_else(|| original.product_type.clone());
        let area = match edit.area {
            Some(area) => {
                ensure_minimum_area(area)?;
                area
            }
            None => original.area,
        };

        let (product, state) = self.resolve(&product_type, &state_code)?;
        Ok(reprice(
            original,
            &customer_name,
            &state_code,
            &product_type,
            area,
            &product,
            &state,
        )?)
    }

    /// Replace `original` with `edited` in `date`'s partition. An audit failure
    /// after the rewrite is logged, not returned.
    pub fn persist_edit(
        &self,
        date: NaiveDate,
        original: &Order,
        edited: &Order,
    ) -> Result<(), ServiceError> {
        self.store.edit(date, original, edited)?;
        self.record(&format!("Order {} for {date} edited.", edited.order_number));
        Ok(())
    }

    /// Remove `order` from `date`'s partition. An audit failure after the
    /// rewrite is logged, not returned.
    pub fn remove_order(&self, date: NaiveDate, order: &Order) -> Result<(), ServiceError> {
        self.store.remove(date, order)?;
        self.record(&format!("Order {} for {date} removed.", order.order_number));
        Ok(())
    }

    /// Write the consolidated export to the configured file. An audit failure
    /// after the export is committed is logged, not returned.
    pub fn export_all(&self) -> Result<ExportSummary, ServiceError> {
        let summary = export_all(&self.store, &self.config.export_file)?;
        self.record("All order data exported.");
        Ok(summary)
    }

    /// Audit an operation that has already taken effect.
    fn record(&self, message: &str) {
        if let Err(err) = self.audit.write_entry(message) {
            warn!(error = %err, message, "audit entry not written");
        }
    }

    fn resolve(&self, product_type: &str, state_code: &str) -> Result<(Product, State), ServiceError> {
        let products = read_products(&self.config.products_file)?;
        let product = find_product(&products, product_type)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("product '{product_type}'")))?;

        let states = read_tax_table(&self.config.taxes_file)?;
        let state = find_state(&states, state_code)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("state '{state_code}'")))?;

        Ok((product, state))
    }
}

fn ensure_minimum_area(area: Decimal) -> Result<(), DomainError> {
    if area < MINIMUM_AREA {
        return Err(DomainError::validation(format!(
            "area must be at least {MINIMUM_AREA} sq ft (got {area})"
        )));
    }
    Ok(())
}
