//! GoMarket Cart - Persisted shopping-cart state.
//!
//! [`CartStore`] keeps the in-memory cart, publishes every change to
//! subscribers, and mirrors the cart into a [`KeyValueStore`] under a single
//! key. The store is constructed once and handed to consumers; it must be
//! activated (which hydrates it from storage) before use.
//!
//! # Example
//!
//! ```rust
//! # async fn demo() -> Result<(), go_market_cart::CartError> {
//! use std::sync::Arc;
//!
//! use go_market_cart::{CartConfig, CartStore, MemoryStore};
//! use go_market_core::{NewLineItem, Price};
//!
//! let store = CartStore::new(Arc::new(MemoryStore::new()), &CartConfig::default());
//! store.activate().await;
//!
//! store.add_to_cart(NewLineItem::new("p1", "Tote", "tote.png", Price::from_cents(1299)))?;
//! assert_eq!(store.snapshot()?.item_count(), 1);
//!
//! store.flush().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment-driven settings (storage key, data directory)
//! - [`error`] - Cart usage errors
//! - [`storage`] - The key-value contract and its memory/file backends
//! - [`store`] - The cart store and its background writer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::CartStore;
