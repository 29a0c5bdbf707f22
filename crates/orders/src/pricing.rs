//! Pricing calculator.
//!
//! Derivation order is fixed: material cost, labor cost, tax on their rounded
//! sum, then the total as the sum of the three rounded components. Deriving the
//! total any other way drifts by a cent on some inputs.

use rust_decimal::Decimal;

use flooring_catalog::{Product, State};
use flooring_core::{
    AREA_SCALE, DomainError, DomainResult, MONEY_SCALE, TAX_RATE_SCALE, round_down, round_half_up,
};

use crate::codec::DELIMITER;
use crate::order::{Order, PricedOrder};

/// Price a new order.
///
/// `product` and `state` are the catalog records the caller resolved for
/// `product_type` and `state_code`. The area minimum is the caller's policy and
/// is not checked here.
pub fn compute_order(
    customer_name: &str,
    state_code: &str,
    product_type: &str,
    area: Decimal,
    product: &Product,
    state: &State,
) -> DomainResult<PricedOrder> {
    validate_customer_name(customer_name)?;
    if product.product_type != product_type {
        return Err(DomainError::validation(format!(
            "product '{}' does not match requested type '{product_type}'",
            product.product_type
        )));
    }
    if state.code != state_code {
        return Err(DomainError::validation(format!(
            "state '{}' does not match requested code '{state_code}'",
            state.code
        )));
    }

    let area = round_half_up(area, AREA_SCALE);
    let tax_rate = round_half_up(state.tax_rate, TAX_RATE_SCALE);
    let cost_per_square_foot = round_down(product.cost_per_square_foot, MONEY_SCALE);
    let labor_cost_per_square_foot = round_down(product.labor_cost_per_square_foot, MONEY_SCALE);

    let material_cost = round_half_up(mul(cost_per_square_foot, area)?, MONEY_SCALE);
    let labor_cost = round_half_up(mul(labor_cost_per_square_foot, area)?, MONEY_SCALE);
    let taxable = add(material_cost, labor_cost)?;
    let tax = round_half_up(mul(mul(tax_rate, Decimal::new(1, 2))?, taxable)?, MONEY_SCALE);
    let total = add(tax, taxable)?;

    Ok(PricedOrder {
        customer_name: customer_name.to_string(),
        state: state.code.clone(),
        tax_rate,
        product_type: product.product_type.clone(),
        area,
        cost_per_square_foot,
        labor_cost_per_square_foot,
        material_cost,
        labor_cost,
        tax,
        total,
    })
}

/// Price an edit of `original`, keeping its order number.
pub fn reprice(
    original: &Order,
    customer_name: &str,
    state_code: &str,
    product_type: &str,
    area: Decimal,
    product: &Product,
    state: &State,
) -> DomainResult<Order> {
    compute_order(customer_name, state_code, product_type, area, product, state)
        .map(|priced| priced.assign(original.order_number))
}

fn validate_customer_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("customer name cannot be empty"));
    }
    if name.contains(DELIMITER) || name.contains(['\n', '\r']) {
        return Err(DomainError::validation(
            "customer name cannot contain commas or line breaks",
        ));
    }
    Ok(())
}

fn mul(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| DomainError::invariant("pricing overflow"))
}

fn add(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| DomainError::invariant("pricing overflow"))
}
