//! Order payload sent to `POST /update-products-quantity`.

use cart::{CartLine, CartView};
use common::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product of an order: current catalog attributes plus the cart quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product.id,
            name: line.product.name.clone(),
            description: line.product.description.clone(),
            price: line.product.price,
            quantity: line.quantity,
        }
    }
}

/// Body of the order-placement request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub products: Vec<OrderLine>,
}

impl OrderRequest {
    /// Builds the payload from a fresh cart/catalog join.
    pub fn from_view(view: &CartView) -> Self {
        Self {
            products: view.lines().iter().map(OrderLine::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn total_items(&self) -> u64 {
        self.products.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn total(&self) -> Decimal {
        self.products
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum()
    }
}

/// Success body of the order endpoint. Anything beyond `message` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub message: Option<String>,
}
