use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog product.
///
/// Wraps the server's integer id so product ids cannot be confused with
/// quantities or stock counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a product ID from the server's integer id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// A catalog record as served by `GET /products` and the push channel.
///
/// On the wire the available stock travels under the `quantity` field and
/// the price is a plain JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "quantity")]
    pub available_stock: u32,
}

impl Product {
    /// Creates a product record.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        available_stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            available_stock,
        }
    }

    /// Returns true if no units are available.
    pub fn is_out_of_stock(&self) -> bool {
        self.available_stock == 0
    }
}
