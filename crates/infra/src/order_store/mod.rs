//! Order persistence boundary.
//!
//! `OrderStore` abstracts date-partitioned order storage so the flat-file
//! layout and an in-memory map are interchangeable behind the service layer.

pub mod file;
pub mod in_memory;
pub mod r#trait;

pub use file::FileOrderStore;
pub use in_memory::InMemoryOrderStore;
pub use r#trait::{OrderStore, StoreError};
