//! Reference catalogs (products and tax jurisdictions).
//!
//! Catalogs are read-only snapshots parsed from comma-delimited text files
//! with a header row. Callers reload them per operation; nothing here caches.

pub mod error;
pub mod product;
mod reader;
pub mod tax;

pub use error::CatalogError;
pub use product::{Product, find_product, product_types, read_products};
pub use tax::{State, find_state, read_tax_table, state_codes};
