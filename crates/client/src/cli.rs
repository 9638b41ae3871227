//! Line-oriented command front end.

use std::fmt::Write as _;

use cart::CartView;
use common::{Product, ProductId};
use secrecy::SecretString;

use crate::auth::RegisterRequest;
use crate::{ClientError, Result};

pub const HELP: &str = "\
commands:
  login <email> <password>
  register <name> <email> <mobile> <password> <address...>
  logout
  products
  add <id>
  set <id> <quantity>
  remove <id>
  cart
  checkout
  help
  quit";

/// One parsed input line.
#[derive(Debug)]
pub enum Command {
    Login { email: String, password: SecretString },
    Register(RegisterRequest),
    Logout,
    Products,
    Add { id: ProductId },
    Set { id: ProductId, quantity: i64 },
    Remove { id: ProductId },
    Cart,
    Checkout,
    Help,
    Quit,
}

impl Command {
    /// Parses a line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("login", [email, password]) => Command::Login {
                email: (*email).to_string(),
                password: SecretString::from((*password).to_string()),
            },
            ("register", [name, email, mobile, password, address @ ..]) if !address.is_empty() => {
                Command::Register(RegisterRequest {
                    name: (*name).to_string(),
                    email: (*email).to_string(),
                    mobile: (*mobile).to_string(),
                    address: address.join(" "),
                    password: SecretString::from((*password).to_string()),
                })
            }
            ("logout", []) => Command::Logout,
            ("products", []) => Command::Products,
            ("add", [id]) => Command::Add { id: parse_id(id)? },
            ("set", [id, quantity]) => Command::Set {
                id: parse_id(id)?,
                quantity: quantity
                    .parse()
                    .map_err(|_| ClientError::Usage(format!("not a quantity: {quantity}")))?,
            },
            ("remove", [id]) => Command::Remove { id: parse_id(id)? },
            ("cart", []) => Command::Cart,
            ("checkout", []) => Command::Checkout,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(ClientError::Usage(format!("unrecognised command: {line}\n{HELP}"))),
        };
        Ok(Some(command))
    }
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse::<i64>()
        .map(ProductId::new)
        .map_err(|_| ClientError::Usage(format!("not a product id: {raw}")))
}

/// Renders the catalog as a table.
pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "no products".to_string();
    }
    let mut out = String::new();
    for product in products {
        let stock = if product.is_out_of_stock() {
            "out of stock".to_string()
        } else {
            format!("{} in stock", product.available_stock)
        };
        let _ = writeln!(
            out,
            "{:>5}  {:<30} {:>10}  {}",
            product.id, product.name, product.price, stock
        );
    }
    out
}

/// Renders the joined cart with totals and stale-entry warnings.
pub fn render_cart(view: &CartView) -> String {
    if view.is_empty() {
        return "cart is empty".to_string();
    }
    let mut out = String::new();
    for line in view.lines() {
        let _ = write!(
            out,
            "{:>5}  {:<30} {:>4} x {:>10} = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total()
        );
        if line.exceeds_stock() {
            let _ = write!(out, "  (only {} available)", line.product.available_stock);
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} items, total {}",
        view.total_items(),
        view.grand_total()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart::CartStore;
    use catalog::CatalogSnapshot;
    use rust_decimal::Decimal;
    use secrecy::ExposeSecret;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            Command::parse("add 3").unwrap(),
            Some(Command::Add { id }) if id == ProductId::new(3)
        ));
        assert!(matches!(
            Command::parse("  set 3 -1 ").unwrap(),
            Some(Command::Set { quantity: -1, .. })
        ));
        assert!(matches!(Command::parse("quit").unwrap(), Some(Command::Quit)));
        assert!(matches!(Command::parse("exit").unwrap(), Some(Command::Quit)));
        assert!(Command::parse("   ").unwrap().is_none());
    }

    #[test]
    fn test_parse_login_and_register() {
        let Some(Command::Login { email, password }) =
            Command::parse("login a@b.c hunter2").unwrap()
        else {
            panic!("expected login");
        };
        assert_eq!(email, "a@b.c");
        assert_eq!(password.expose_secret(), "hunter2");

        let Some(Command::Register(request)) =
            Command::parse("register Ann ann@x.io 555 pw 1 Main St").unwrap()
        else {
            panic!("expected register");
        };
        assert_eq!(request.address, "1 Main St");
        assert_eq!(request.mobile, "555");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("add x").is_err());
        assert!(Command::parse("set 1").is_err());
        assert!(Command::parse("register Ann ann@x.io 555 pw").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn test_render_cart_marks_stale_lines() {
        let catalog = CatalogSnapshot::from_products([Product::new(
            1,
            "Mug",
            "",
            Decimal::new(1000, 2),
            1,
        )]);
        let mut store = CartStore::new();
        store.update_quantity(ProductId::new(1), 2);

        let text = render_cart(&CartView::join(&store, &catalog));

        assert!(text.contains("(only 1 available)"));
        assert!(text.ends_with("2 items, total 20.00"));
    }

    #[test]
    fn test_render_products() {
        let text = render_products(&[Product::new(2, "Cap", "", Decimal::new(500, 2), 0)]);
        assert!(text.contains("out of stock"));
        assert_eq!(render_products(&[]), "no products");
    }
}
