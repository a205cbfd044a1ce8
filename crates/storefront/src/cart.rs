//! Client-local shopping cart.
//!
//! Lines are keyed by a per-addition [`CartLineId`], not by product: adding
//! the same product twice yields two independent lines and quantities are
//! never coalesced.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rahat_core::{Money, ProductId};

use crate::models::Product;

/// Identity of one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineId(Uuid);

impl CartLineId {
    /// A fresh, never-before-issued line id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CartLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl core::str::FromStr for CartLineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A product the customer added, as one cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub line_id: CartLineId,
    pub product: Product,
}

impl CartItem {
    /// The line's price in USD.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.product.price
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }
}

/// Ordered list of cart lines. Lost when the process exits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `product` as a new line and return the line's id.
    pub fn add(&mut self, product: Product) -> CartLineId {
        let line_id = CartLineId::generate();
        self.lines.push(CartItem { line_id, product });
        line_id
    }

    /// Remove the line with `line_id`, returning it if present.
    pub fn remove(&mut self, line_id: CartLineId) -> Option<CartItem> {
        let index = self.lines.iter().position(|l| l.line_id == line_id)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line prices in USD.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartItem::price).sum()
    }
}
