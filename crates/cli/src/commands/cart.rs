//! Cart commands.
//!
//! # Environment Variables
//!
//! - `GO_MARKET_CART_KEY` - Storage key of the cart record
//! - `GO_MARKET_DATA_DIR` - Directory holding `storage.json`

use std::fmt::Write as _;
use std::sync::Arc;

use go_market_cart::{CartConfig, CartError, CartStore, ConfigError, FileStore};
use go_market_core::{CartState, NewLineItem, Price, PriceError, ProductId};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart rejected the operation.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The `--price` argument is not a valid price.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),
}

/// Open and activate the file-backed cart named by the environment.
pub async fn open_store() -> Result<CartStore, CommandError> {
    let config = CartConfig::from_env()?;
    let storage = FileStore::new(config.storage_file());
    tracing::debug!(path = %storage.path().display(), "Opening cart storage");

    let store = CartStore::new(Arc::new(storage), &config);
    store.activate().await;
    Ok(store)
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show(store: &CartStore) -> Result<(), CommandError> {
    print!("{}", render(&store.snapshot()?));
    Ok(())
}

/// Add one unit of a product.
pub fn add(
    store: &CartStore,
    id: String,
    title: String,
    image_url: String,
    price: &str,
) -> Result<(), CommandError> {
    let price: Price = price.parse()?;
    let line = store.add_to_cart(NewLineItem::new(id, title, image_url, price))?;
    tracing::info!(product_id = %line.id, quantity = line.quantity.get(), "Added to cart");
    Ok(())
}

/// Add one unit to an existing line.
pub fn increment(store: &CartStore, id: String) -> Result<(), CommandError> {
    let line = store.increment(&ProductId::new(id))?;
    tracing::info!(product_id = %line.id, quantity = line.quantity.get(), "Quantity increased");
    Ok(())
}

/// Remove one unit from an existing line.
pub fn decrement(store: &CartStore, id: String) -> Result<(), CommandError> {
    let line = store.decrement(&ProductId::new(id))?;
    tracing::info!(product_id = %line.id, quantity = line.quantity.get(), "Quantity decreased");
    Ok(())
}

/// Empty the cart.
pub fn clear(store: &CartStore) -> Result<(), CommandError> {
    store.clear()?;
    Ok(())
}

/// Format a cart as a plain-text table.
fn render(cart: &CartState) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for line in cart {
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>4} x {:>10} = {:>10}",
            line.id,
            line.title,
            line.quantity,
            line.price,
            line.line_total()
        );
    }
    let _ = writeln!(out, "{} item(s), subtotal {}", cart.item_count(), cart.subtotal());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&CartState::new()), "Cart is empty\n");
    }

    #[test]
    fn test_render_lists_lines_and_totals() {
        let mut cart = CartState::new();
        cart.add(NewLineItem::new("p1", "Tote", "t.png", Price::from_cents(1299)));
        cart.add(NewLineItem::new("p1", "Tote", "t.png", Price::from_cents(1299)));
        cart.add(NewLineItem::new("p2", "Mug", "m.png", Price::from_cents(500)));

        let text = render(&cart);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("p1"));
        assert!(lines[0].contains("$25.98"));
        assert!(lines[1].starts_with("p2"));
        assert_eq!(lines[2], "3 item(s), subtotal $30.98");
    }
}
