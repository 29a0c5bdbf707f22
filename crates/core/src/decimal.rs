//! Fixed-scale decimal helpers.
//!
//! Every persisted amount has a canonical scale. Values are brought to that
//! scale with an explicit rounding mode and then padded, so `2575` renders as
//! `2575.00` and two values at the same scale always render the same way.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency amounts and per-square-foot rates.
pub const MONEY_SCALE: u32 = 2;

/// Tax rates (percent).
pub const TAX_RATE_SCALE: u32 = 3;

/// Areas in square feet.
pub const AREA_SCALE: u32 = 2;

/// Round half away from zero to `scale` places and pad to exactly `scale`.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    to_scale(value, scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate toward zero to `scale` places and pad to exactly `scale`.
pub fn round_down(value: Decimal, scale: u32) -> Decimal {
    to_scale(value, scale, RoundingStrategy::ToZero)
}

fn to_scale(value: Decimal, scale: u32, strategy: RoundingStrategy) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, strategy);
    // round_dp never increases the scale; rescale only pads here.
    rounded.rescale(scale);
    rounded
}
