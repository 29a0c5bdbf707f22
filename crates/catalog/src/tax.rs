use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flooring_core::{TAX_RATE_SCALE, round_half_up};

use crate::error::CatalogError;
use crate::reader::read_table;

const TAX_FIELDS: usize = 3;

/// A tax jurisdiction, keyed by its abbreviation (`code`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub code: String,
    pub name: String,
    /// Percent, three decimals.
    pub tax_rate: Decimal,
}

impl State {
    /// Build a state, rounding the rate half-up to three decimals.
    pub fn new(code: impl Into<String>, name: impl Into<String>, tax_rate: Decimal) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            tax_rate: round_half_up(tax_rate, TAX_RATE_SCALE),
        }
    }

    fn from_fields(fields: &[&str]) -> Result<Self, String> {
        let (code, name, raw_rate) = (fields[0], fields[1], fields[2]);
        if code.is_empty() {
            return Err("state code cannot be empty".to_string());
        }
        let rate = Decimal::from_str(raw_rate).map_err(|e| format!("TaxRate '{raw_rate}': {e}"))?;
        Ok(Self::new(code, name, rate))
    }
}

/// Load `StateCode,StateName,TaxRate` records.
pub fn read_tax_table(path: impl AsRef<Path>) -> Result<Vec<State>, CatalogError> {
    read_table(path.as_ref(), TAX_FIELDS, State::from_fields)
}

/// First state whose code matches exactly.
pub fn find_state<'a>(states: &'a [State], code: &str) -> Option<&'a State> {
    states.iter().find(|s| s.code == code)
}

/// State codes in catalog order.
pub fn state_codes(states: &[State]) -> Vec<String> {
    states.iter().map(|s| s.code.clone()).collect()
}
