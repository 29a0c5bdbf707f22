//! `flooring-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod decimal;
pub mod entity;
pub mod error;
pub mod id;

pub use decimal::{AREA_SCALE, MONEY_SCALE, TAX_RATE_SCALE, round_down, round_half_up};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::OrderNumber;
