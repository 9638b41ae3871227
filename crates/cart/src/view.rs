//! Use-time join of the cart with the catalog.

use catalog::CatalogSnapshot;
use common::{Product, ProductId};
use rust_decimal::Decimal;

use crate::store::CartStore;

/// A cart entry paired with the product's current catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price × quantity.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// True when the entry asks for more than is currently in stock.
    pub fn exceeds_stock(&self) -> bool {
        self.quantity > self.product.available_stock
    }
}

/// The cart as it would be shown or submitted right now.
///
/// Built fresh from the [`CartStore`] and a catalog snapshot every time;
/// nothing is cached. Entries whose id is missing from the catalog are left
/// out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartView {
    lines: Vec<CartLine>,
}

impl CartView {
    /// Joins cart quantities with catalog attributes, ordered by product id.
    pub fn join(cart: &CartStore, catalog: &CatalogSnapshot) -> Self {
        let lines = cart
            .items()
            .filter_map(|(id, quantity)| {
                let product = catalog.get(id)?;
                Some(CartLine {
                    product: product.clone(),
                    quantity,
                })
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over the joined lines.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn grand_total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines left over from before a stock decrease.
    pub fn stale_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.exceeds_stock())
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}
