use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flooring_core::{Entity, OrderNumber};

/// A priced order that has not been given a number yet.
///
/// Produced by the pricing calculator; the store assigns the number when the
/// order is first persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedOrder {
    pub customer_name: String,
    /// State abbreviation.
    pub state: String,
    pub tax_rate: Decimal,
    pub product_type: String,
    pub area: Decimal,
    pub cost_per_square_foot: Decimal,
    pub labor_cost_per_square_foot: Decimal,
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl PricedOrder {
    /// Attach an order number.
    pub fn assign(self, order_number: OrderNumber) -> Order {
        Order {
            order_number,
            customer_name: self.customer_name,
            state: self.state,
            tax_rate: self.tax_rate,
            product_type: self.product_type,
            area: self.area,
            cost_per_square_foot: self.cost_per_square_foot,
            labor_cost_per_square_foot: self.labor_cost_per_square_foot,
            material_cost: self.material_cost,
            labor_cost: self.labor_cost,
            tax: self.tax,
            total: self.total,
        }
    }
}

/// A persisted flooring order.
///
/// Decimal equality ignores trailing zeros (`2575.0 == 2575.00`); the codec is
/// what pins every field to its canonical scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: OrderNumber,
    pub customer_name: String,
    /// State abbreviation.
    pub state: String,
    /// Percent, three decimals.
    pub tax_rate: Decimal,
    pub product_type: String,
    /// Square feet.
    pub area: Decimal,
    pub cost_per_square_foot: Decimal,
    pub labor_cost_per_square_foot: Decimal,
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Entity for Order {
    type Id = OrderNumber;

    fn id(&self) -> &Self::Id {
        &self.order_number
    }
}
