//! Integration tests for the GoMarket cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-market-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart behaviour end to end over the in-memory backend
//! - `file_persistence` - Restart and corruption handling over the file backend

use std::sync::Arc;

use go_market_cart::{CartConfig, CartStore, KeyValueStore};
use go_market_core::{NewLineItem, Price};

/// A product descriptor with predictable display fields.
#[must_use]
pub fn product(id: &str, cents: u32) -> NewLineItem {
    NewLineItem::new(
        id,
        format!("Product {id}"),
        format!("https://cdn.example/{id}.png"),
        Price::from_cents(cents),
    )
}

/// Build and activate a store over `storage` with the default key.
pub async fn open_store(storage: Arc<dyn KeyValueStore>) -> CartStore {
    let store = CartStore::new(storage, &CartConfig::default());
    store.activate().await;
    store
}

/// Product IDs of the store's lines, in order.
///
/// # Panics
///
/// Panics if the store is not active.
#[must_use]
pub fn ids(store: &CartStore) -> Vec<String> {
    store
        .products()
        .expect("store is active")
        .into_iter()
        .map(|line| line.id.into_inner())
        .collect()
}
