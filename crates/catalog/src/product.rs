use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flooring_core::{MONEY_SCALE, round_down};

use crate::error::CatalogError;
use crate::reader::read_table;

const PRODUCT_FIELDS: usize = 3;

/// A flooring material and its per-square-foot rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_type: String,
    pub cost_per_square_foot: Decimal,
    pub labor_cost_per_square_foot: Decimal,
}

impl Product {
    /// Build a product, truncating both rates to two decimals.
    pub fn new(
        product_type: impl Into<String>,
        cost_per_square_foot: Decimal,
        labor_cost_per_square_foot: Decimal,
    ) -> Self {
        Self {
            product_type: product_type.into(),
            cost_per_square_foot: round_down(cost_per_square_foot, MONEY_SCALE),
            labor_cost_per_square_foot: round_down(labor_cost_per_square_foot, MONEY_SCALE),
        }
    }

    fn from_fields(fields: &[&str]) -> Result<Self, String> {
        let product_type = fields[0];
        if product_type.is_empty() {
            return Err("product type cannot be empty".to_string());
        }
        let cost = parse_rate("CostPerSquareFoot", fields[1])?;
        let labor = parse_rate("LaborCostPerSquareFoot", fields[2])?;
        Ok(Self::new(product_type, cost, labor))
    }
}

fn parse_rate(field: &str, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|e| format!("{field} '{raw}': {e}"))
}

/// Load `ProductType,CostPerSquareFoot,LaborCostPerSquareFoot` records.
pub fn read_products(path: impl AsRef<Path>) -> Result<Vec<Product>, CatalogError> {
    read_table(path.as_ref(), PRODUCT_FIELDS, Product::from_fields)
}

/// First product whose type matches exactly.
pub fn find_product<'a>(products: &'a [Product], product_type: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.product_type == product_type)
}

/// Product types in catalog order.
pub fn product_types(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.product_type.clone()).collect()
}
