//! Cart line items and the in-memory cart state.
//!
//! `CartState` owns the reconciliation rules: an add for a product already in
//! the cart bumps its quantity instead of creating a second line, quantities
//! never drop below one, and line order is insertion order.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A single cart entry.
///
/// Serialized with snake_case field names; this is the persisted wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product this line refers to. Unique within a cart.
    pub id: ProductId,
    /// Display name captured when the product was first added.
    pub title: String,
    /// Display image captured when the product was first added.
    pub image_url: String,
    /// Unit price captured when the product was first added.
    pub price: Price,
    /// Number of units, always at least one.
    pub quantity: NonZeroU32,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }
}

/// A product descriptor as submitted by an "add to cart" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewLineItem {
    /// Create a product descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    fn into_line(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: NonZeroU32::MIN,
        }
    }
}

/// Ordered cart contents, unique by product ID.
///
/// Serializes as a bare JSON array of [`LineItem`]. Deserialization merges
/// duplicate IDs so the uniqueness invariant holds for any persisted input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw lines.
    ///
    /// Lines sharing an ID collapse into the first occurrence: its title,
    /// image and price win and the quantities are summed.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut state = Self::new();
        for line in items {
            match state.position(&line.id) {
                Some(index) => {
                    if let Some(existing) = state.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity.get());
                    }
                }
                None => state.items.push(line),
            }
        }
        state
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Add one unit of a product.
    ///
    /// An existing line keeps the title, image and price it was created with;
    /// only its quantity changes. Returns the affected line.
    #[allow(clippy::indexing_slicing)] // indices come from `position` or the push just above
    pub fn add(&mut self, item: NewLineItem) -> &LineItem {
        match self.position(&item.id) {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line.quantity.saturating_add(1);
                line
            }
            None => {
                self.items.push(item.into_line());
                &self.items[self.items.len() - 1]
            }
        }
    }

    /// Add one unit to an existing line.
    ///
    /// Returns the updated line, or `None` if the product is not in the cart.
    pub fn increment(&mut self, id: &ProductId) -> Option<&LineItem> {
        let line = self.items.iter_mut().find(|line| &line.id == id)?;
        line.quantity = line.quantity.saturating_add(1);
        Some(line)
    }

    /// Remove one unit from an existing line, never going below one.
    ///
    /// Returns `None` if the product is not in the cart, `Some(false)` when the
    /// line is already at one unit, and `Some(true)` when the quantity dropped.
    pub fn decrement(&mut self, id: &ProductId) -> Option<bool> {
        let line = self.items.iter_mut().find(|line| &line.id == id)?;
        match NonZeroU32::new(line.quantity.get() - 1) {
            Some(quantity) => {
                line.quantity = quantity;
                Some(true)
            }
            None => Some(false),
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|line| &line.id == id)
    }
}

impl From<Vec<LineItem>> for CartState {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<CartState> for Vec<LineItem> {
    fn from(state: CartState) -> Self {
        state.items
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
