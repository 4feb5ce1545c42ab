//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄─┐│  id (UUID)      │◄──│  order_id (FK)  │       │
//! │  │  name           │  ││  owner_id       │   │  quantity       │       │
//! │  │  price_cents    │  ││  total_cents    │   │  unit_price     │       │
//! │  │  stock          │  │└─────────────────┘   │  (snapshot)     │       │
//! │  └─────────────────┘  └──────────────────────│  product (FK)   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An order item's price is frozen when the order is placed. Later catalog
//! price changes never touch it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form description, may be empty.
    pub description: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating or fully replacing a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl ProductDraft {
    /// Builds a fresh product with a new id and both timestamps set to `now`.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order with all of its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier (UUID v4), fixed at creation.
    pub id: String,

    /// Identity of the customer who placed the order.
    pub owner_id: String,

    /// Sum of every line's snapshot price times quantity, in cents.
    pub total_price_cents: i64,

    /// When the order was placed.
    pub created_at: DateTime<Utc>,

    /// Line items in request order.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,

    /// Price per unit at the moment of purchase.
    pub unit_price_cents: i64,

    /// Catalog data for the product.
    pub product: Product,
}

impl OrderItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
