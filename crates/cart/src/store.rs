//! Cart state container.

use std::collections::BTreeMap;

use common::ProductId;
use serde::{Deserialize, Serialize};

/// A transition of the cart state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CartAction {
    /// Adds one unit, inserting the product with quantity 1 if absent.
    AddToCart { id: ProductId },

    /// Sets an absolute quantity; zero or less removes the entry.
    UpdateQuantity { id: ProductId, quantity: i64 },

    /// Removes the entry regardless of its quantity.
    RemoveFromCart { id: ProductId },

    /// Empties the cart.
    ClearCart,
}

impl CartAction {
    /// Returns the action name.
    pub fn action_type(&self) -> &'static str {
        match self {
            CartAction::AddToCart { .. } => "AddToCart",
            CartAction::UpdateQuantity { .. } => "UpdateQuantity",
            CartAction::RemoveFromCart { .. } => "RemoveFromCart",
            CartAction::ClearCart => "ClearCart",
        }
    }
}

/// Product id → requested quantity.
///
/// Only quantities are stored. Names and prices are joined in from the
/// catalog whenever the cart is shown or submitted, so a catalog update is
/// reflected without touching the cart.
///
/// Every stored quantity is at least 1; an id with no units is absent.
/// Transitions never fail: bounds are checked by
/// [`QuantityGuard`](crate::QuantityGuard) before a transition is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    items: BTreeMap<ProductId, u32>,
}

impl CartStore {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a transition to the cart.
    ///
    /// Pure and deterministic: the same state and action always produce the
    /// same new state.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::AddToCart { id } => {
                let quantity = self.items.entry(id).or_insert(0);
                *quantity = quantity.saturating_add(1);
            }
            CartAction::UpdateQuantity { id, quantity } => {
                if quantity > 0 {
                    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                    self.items.insert(id, quantity);
                } else {
                    self.items.remove(&id);
                }
            }
            CartAction::RemoveFromCart { id } => {
                self.items.remove(&id);
            }
            CartAction::ClearCart => self.items.clear(),
        }
    }

    /// Applies multiple transitions in sequence.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = CartAction>) {
        for action in actions {
            self.apply(action);
        }
    }

    pub fn add_to_cart(&mut self, id: ProductId) {
        self.apply(CartAction::AddToCart { id });
    }

    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        self.apply(CartAction::UpdateQuantity { id, quantity });
    }

    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.apply(CartAction::RemoveFromCart { id });
    }

    pub fn clear_cart(&mut self) {
        self.apply(CartAction::ClearCart);
    }
}

// Query methods
impl CartStore {
    /// Returns the requested quantity, or `None` if the product is absent.
    pub fn quantity(&self, id: ProductId) -> Option<u32> {
        self.items.get(&id).copied()
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.items.contains_key(&id)
    }

    /// Returns all entries ordered by product id.
    pub fn items(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.items.iter().map(|(id, quantity)| (*id, *quantity))
    }

    /// Returns the number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the sum of all quantities (the cart badge count).
    pub fn total_quantity(&self) -> u64 {
        self.items.values().map(|q| u64::from(*q)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_add_inserts_with_quantity_one() {
        let mut cart = CartStore::new();
        cart.add_to_cart(id(1));
        assert_eq!(cart.quantity(id(1)), Some(1));
    }

    #[test]
    fn test_add_increments_existing() {
        let mut cart = CartStore::new();
        cart.add_to_cart(id(1));
        cart.add_to_cart(id(1));
        cart.add_to_cart(id(1));
        assert_eq!(cart.quantity(id(1)), Some(3));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_sets_absolute_quantity() {
        let mut cart = CartStore::new();
        cart.add_to_cart(id(1));
        cart.update_quantity(id(1), 7);
        assert_eq!(cart.quantity(id(1)), Some(7));
    }

    #[test]
    fn test_update_inserts_absent_product() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(4), 2);
        assert_eq!(cart.quantity(id(4)), Some(2));
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(1), 2);
        cart.update_quantity(id(2), 2);

        cart.update_quantity(id(1), 0);
        cart.update_quantity(id(2), -3);

        assert!(cart.is_empty());
        assert!(!cart.contains(id(1)));
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(1), 9);
        cart.remove_from_cart(id(1));
        cart.remove_from_cart(id(2));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add_to_cart(id(1));
        cart.add_to_cart(id(2));
        cart.clear_cart();
        assert_eq!(cart, CartStore::new());
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(1), 2);
        cart.update_quantity(id(2), 3);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_huge_quantity_saturates() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(1), i64::MAX);
        cart.add_to_cart(id(1));
        assert_eq!(cart.quantity(id(1)), Some(u32::MAX));
    }

    #[test]
    fn test_apply_all_matches_individual_calls() {
        let mut a = CartStore::new();
        a.apply_all([
            CartAction::AddToCart { id: id(1) },
            CartAction::AddToCart { id: id(1) },
            CartAction::UpdateQuantity {
                id: id(2),
                quantity: 4,
            },
            CartAction::RemoveFromCart { id: id(1) },
        ]);

        let mut b = CartStore::new();
        b.add_to_cart(id(1));
        b.add_to_cart(id(1));
        b.update_quantity(id(2), 4);
        b.remove_from_cart(id(1));

        assert_eq!(a, b);
    }

    #[test]
    fn test_action_type() {
        assert_eq!(CartAction::ClearCart.action_type(), "ClearCart");
        assert_eq!(
            CartAction::AddToCart { id: id(1) }.action_type(),
            "AddToCart"
        );
    }

    #[test]
    fn test_serialization() {
        let mut cart = CartStore::new();
        cart.update_quantity(id(3), 2);
        let json = serde_json::to_string(&cart).unwrap();
        let deserialized: CartStore = serde_json::from_str(&json).unwrap();
        assert_eq!(cart, deserialized);
    }
}
