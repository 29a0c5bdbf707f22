//! Infrastructure layer: order storage, export, audit, config, service wiring.

pub mod audit;
pub mod config;
pub mod export;
pub mod fs;
pub mod order_store;
pub mod service;

#[cfg(test)]
mod test_support;

pub use audit::{AuditSink, FileAuditLog, InMemoryAuditLog};
pub use config::{AppConfig, ConfigError};
pub use export::{ExportSummary, export_all};
pub use order_store::{FileOrderStore, InMemoryOrderStore, OrderStore, StoreError};
pub use service::{MINIMUM_AREA, OrderEdit, OrderService, ServiceError};
