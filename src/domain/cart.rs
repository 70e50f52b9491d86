use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line of the shopper's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Read-only view of the externally owned cart.
///
/// The checkout flow never mutates it directly; it only asks the cart service to
/// clear it once a payment is confirmed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// A cart whose lines all have zero quantity counts as empty.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.quantity == 0)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Result of a cart-clear request. Both variants count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartClearOutcome {
    Cleared,
    AlreadyEmpty,
}
