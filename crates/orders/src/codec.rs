//! Flat-file line codec for orders.
//!
//! One order per line, twelve comma-separated fields in `HEADER` order. There
//! is no quoting or escaping; text fields must not contain the delimiter.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use flooring_core::{AREA_SCALE, MONEY_SCALE, OrderNumber, TAX_RATE_SCALE, round_half_up};

use crate::order::Order;

pub const DELIMITER: char = ',';

/// Header row of every per-date order file.
pub const HEADER: &str = "OrderNumber,CustomerName,State,TaxRate,ProductType,Area,\
CostPerSquareFoot,LaborCostPerSquareFoot,MaterialCost,LaborCost,Tax,Total";

pub const FIELD_COUNT: usize = 12;

/// `MMDDYYYY`, as used in order file names and export lines.
pub const DATE_FORMAT: &str = "%m%d%Y";

/// A line that could not be decoded into an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("missing value for {0}")]
    MissingField(&'static str),

    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid order number '{0}'")]
    InvalidOrderNumber(String),
}

/// Encode an order as one line (no trailing newline).
pub fn marshal(order: &Order) -> String {
    let fields: [String; FIELD_COUNT] = [
        order.order_number.to_string(),
        order.customer_name.clone(),
        order.state.clone(),
        fixed(order.tax_rate, TAX_RATE_SCALE),
        order.product_type.clone(),
        fixed(order.area, AREA_SCALE),
        fixed(order.cost_per_square_foot, MONEY_SCALE),
        fixed(order.labor_cost_per_square_foot, MONEY_SCALE),
        fixed(order.material_cost, MONEY_SCALE),
        fixed(order.labor_cost, MONEY_SCALE),
        fixed(order.tax, MONEY_SCALE),
        fixed(order.total, MONEY_SCALE),
    ];
    fields.join(",")
}

/// `marshal` plus the source date as a thirteenth field.
pub fn marshal_for_export(order: &Order, date: NaiveDate) -> String {
    format!("{}{DELIMITER}{}", marshal(order), date.format(DATE_FORMAT))
}

/// Decode one line. Numeric fields are normalised to their canonical scale.
pub fn unmarshal(line: &str) -> Result<Order, RecordParseError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(RecordParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let order_number = OrderNumber::from_str(fields[0])
        .map_err(|_| RecordParseError::InvalidOrderNumber(fields[0].to_string()))?;

    Ok(Order {
        order_number,
        customer_name: text("CustomerName", fields[1])?,
        state: text("State", fields[2])?,
        tax_rate: number("TaxRate", fields[3], TAX_RATE_SCALE)?,
        product_type: text("ProductType", fields[4])?,
        area: number("Area", fields[5], AREA_SCALE)?,
        cost_per_square_foot: number("CostPerSquareFoot", fields[6], MONEY_SCALE)?,
        labor_cost_per_square_foot: number("LaborCostPerSquareFoot", fields[7], MONEY_SCALE)?,
        material_cost: number("MaterialCost", fields[8], MONEY_SCALE)?,
        labor_cost: number("LaborCost", fields[9], MONEY_SCALE)?,
        tax: number("Tax", fields[10], MONEY_SCALE)?,
        total: number("Total", fields[11], MONEY_SCALE)?,
    })
}

fn fixed(value: Decimal, scale: u32) -> String {
    round_half_up(value, scale).to_string()
}

fn text(field: &'static str, raw: &str) -> Result<String, RecordParseError> {
    if raw.trim().is_empty() {
        return Err(RecordParseError::MissingField(field));
    }
    Ok(raw.to_string())
}

fn number(field: &'static str, raw: &str, scale: u32) -> Result<Decimal, RecordParseError> {
    if raw.is_empty() {
        return Err(RecordParseError::MissingField(field));
    }
    Decimal::from_str(raw)
        .map(|value| round_half_up(value, scale))
        .map_err(|_| RecordParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
