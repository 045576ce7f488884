//! Cart usage errors.
//!
//! Only caller mistakes surface here. Storage and decoding failures are
//! recovered inside the store and logged instead.

use go_market_core::ProductId;
use thiserror::Error;

/// Errors returned by [`CartStore`](crate::CartStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The store was used before `activate()` completed.
    #[error("cart store used before activation")]
    NotActivated,

    /// Increment/decrement targeted a product that is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotInCart(ProductId),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            CartError::NotActivated.to_string(),
            "cart store used before activation"
        );
        assert_eq!(
            CartError::ItemNotInCart(ProductId::new("p9")).to_string(),
            "product p9 is not in the cart"
        );
    }
}
