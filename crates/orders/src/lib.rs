//! Orders domain module.
//!
//! This crate contains the order record, the pricing rules that derive its
//! cost fields, and the flat-file line codec. Pure, deterministic logic only
//! (no IO, no storage).

pub mod codec;
pub mod order;
pub mod pricing;

pub use codec::{HEADER, RecordParseError, marshal, marshal_for_export, unmarshal};
pub use order::{Order, PricedOrder};
pub use pricing::{compute_order, reprice};
