//! Client-held shopping cart.
//!
//! - [`CartStore`] maps product ids to requested quantities, nothing else
//! - [`QuantityGuard`] rejects quantities above current stock
//! - [`CartView`] joins the cart with the catalog when it is shown or submitted
//! - [`Cart`] is the shared handle that routes every change through the guard

pub mod cart;
pub mod error;
pub mod guard;
pub mod store;
pub mod view;

pub use cart::Cart;
pub use error::CartError;
pub use guard::{QuantityGuard, ValidationErrors};
pub use store::{CartAction, CartStore};
pub use view::{CartLine, CartView};
