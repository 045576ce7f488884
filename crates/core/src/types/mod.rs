//! Core types for GoMarket.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{CartState, LineItem, NewLineItem};
pub use id::*;
pub use price::{Price, PriceError};
