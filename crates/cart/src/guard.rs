//! Stock guard for proposed cart changes.

use std::collections::BTreeMap;

use common::{Product, ProductId};

use crate::error::CartError;
use crate::store::CartStore;

/// Per-product validation messages from the most recent rejected proposals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<ProductId, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message recorded for a product.
    pub fn get(&self, id: ProductId) -> Option<&str> {
        self.errors.get(&id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &str)> {
        self.errors.iter().map(|(id, msg)| (*id, msg.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, error: &CartError) {
        self.errors.insert(error.product_id(), error.to_string());
    }

    fn clear_for(&mut self, id: ProductId) {
        self.errors.remove(&id);
    }

    fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Checks every proposed quantity against the product's current stock
/// before it reaches the [`CartStore`].
///
/// The guard keeps no state besides the validation messages, so it must be
/// consulted on every attempt: stock can drop between two attempts.
#[derive(Debug, Clone, Default)]
pub struct QuantityGuard {
    errors: ValidationErrors,
}

impl QuantityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Proposes an absolute quantity for `product`.
    ///
    /// - above the available stock: rejected, the cart is not touched and
    ///   an error is recorded for the product
    /// - zero or less: accepted as a removal
    /// - otherwise: accepted and applied
    ///
    /// Accepted proposals clear any earlier error for the product. Returns
    /// the resulting quantity (`None` when the entry was removed).
    pub fn propose(
        &mut self,
        cart: &mut CartStore,
        product: &Product,
        quantity: i64,
    ) -> Result<Option<u32>, CartError> {
        if quantity > i64::from(product.available_stock) {
            return Err(self.reject(product));
        }

        self.errors.clear_for(product.id);
        cart.update_quantity(product.id, quantity);
        Ok(cart.quantity(product.id))
    }

    /// Proposes adding one more unit of `product`.
    ///
    /// Rejected when the cart already holds as many units as are in stock,
    /// which includes every out-of-stock product.
    pub fn propose_add(
        &mut self,
        cart: &mut CartStore,
        product: &Product,
    ) -> Result<u32, CartError> {
        let current = cart.quantity(product.id).unwrap_or(0);
        if current >= product.available_stock {
            return Err(self.reject(product));
        }

        self.errors.clear_for(product.id);
        cart.add_to_cart(product.id);
        Ok(current + 1)
    }

    /// Clears the error for a product after an unguarded mutation of it.
    pub fn acknowledge(&mut self, id: ProductId) {
        self.errors.clear_for(id);
    }

    /// Clears every error after the cart was emptied.
    pub fn reset(&mut self) {
        self.errors.clear();
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn reject(&mut self, product: &Product) -> CartError {
        let error = CartError::MaximumQuantityReached {
            product_id: product.id,
            available: product.available_stock,
        };
        self.errors.record(&error);
        metrics::counter!("cart_guard_rejections_total").increment(1);
        tracing::warn!(
            product_id = %product.id,
            available = product.available_stock,
            "quantity rejected"
        );
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: i64, stock: u32) -> Product {
        Product::new(id, "Widget", "", Decimal::new(1000, 2), stock)
    }

    #[test]
    fn test_accepts_quantity_within_stock() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();

        let result = guard.propose(&mut cart, &product(1, 3), 3);

        assert_eq!(result, Ok(Some(3)));
        assert_eq!(cart.quantity(ProductId::new(1)), Some(3));
        assert!(guard.errors().is_empty());
    }

    #[test]
    fn test_rejects_quantity_above_stock() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();
        cart.update_quantity(ProductId::new(1), 2);

        let result = guard.propose(&mut cart, &product(1, 3), 5);

        assert!(matches!(
            result,
            Err(CartError::MaximumQuantityReached { available: 3, .. })
        ));
        assert_eq!(cart.quantity(ProductId::new(1)), Some(2));
        assert_eq!(
            guard.errors().get(ProductId::new(1)),
            Some("Maximum quantity reached (3 available).")
        );
    }

    #[test]
    fn test_valid_proposal_clears_error() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();
        let widget = product(1, 3);

        let _ = guard.propose(&mut cart, &widget, 4);
        assert_eq!(guard.errors().len(), 1);

        guard.propose(&mut cart, &widget, 2).unwrap();
        assert!(guard.errors().get(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_non_positive_is_a_removal() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();
        let widget = product(1, 0);
        cart.update_quantity(widget.id, 2);

        assert_eq!(guard.propose(&mut cart, &widget, 0), Ok(None));
        assert!(cart.is_empty());
        assert_eq!(guard.propose(&mut cart, &widget, -1), Ok(None));
    }

    #[test]
    fn test_errors_are_per_product() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();

        let _ = guard.propose(&mut cart, &product(1, 1), 2);
        let _ = guard.propose(&mut cart, &product(2, 1), 2);
        guard.propose(&mut cart, &product(2, 1), 1).unwrap();

        assert!(guard.errors().get(ProductId::new(1)).is_some());
        assert!(guard.errors().get(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_propose_add_until_stock_exhausted() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();
        let widget = product(1, 2);

        assert_eq!(guard.propose_add(&mut cart, &widget), Ok(1));
        assert_eq!(guard.propose_add(&mut cart, &widget), Ok(2));
        assert!(guard.propose_add(&mut cart, &widget).is_err());
        assert_eq!(cart.quantity(widget.id), Some(2));
    }

    #[test]
    fn test_propose_add_out_of_stock() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();

        let result = guard.propose_add(&mut cart, &product(1, 0));

        assert!(result.is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_guard_sees_lowered_stock() {
        let mut guard = QuantityGuard::new();
        let mut cart = CartStore::new();
        guard.propose(&mut cart, &product(1, 5), 4).unwrap();

        // Stock dropped to 2 after the entry was made: the stale entry stays,
        // but the next increase is rejected.
        let result = guard.propose(&mut cart, &product(1, 2), 5);

        assert!(result.is_err());
        assert_eq!(cart.quantity(ProductId::new(1)), Some(4));
    }
}
