//! GoMarket Core - Shared cart types.
//!
//! This crate provides the cart types consumed by the other GoMarket crates:
//! - `go-market-cart` - The cart store and its storage backends
//! - `go-market-cli` - Command-line access to a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no storage access, no async runtime. Persistence lives in `go-market-cart`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices, plus cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
