//! # storefront-core: Pure Domain Logic for the Storefront
//!
//! Everything the storefront knows about products, orders and money that
//! does not need a database or a network socket lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/storefront-api (axum)                      │   │
//! │  │    /products ──► /orders ──► JWT identity ──► ApiError          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db                                   │   │
//! │  │    ProductRepository, OrderRepository, OrderService             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Request  │  │   rules   │  │   │
//! │  │   │  Order    │  │  parsing  │  │  Ledger   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Order, OrderItem
//! - [`money`] - Money type with integer arithmetic
//! - [`order`] - Order requests, running stock reservations, order assembly
//! - [`context`] - Caller identity passed into every read and write
//! - [`pagination`] - Page requests and page envelopes
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price: Money = "10.00".parse().unwrap();
//! let line = price.checked_mul_quantity(2).unwrap();
//! let total = line.checked_add(Money::from_cents(350)).unwrap();
//!
//! assert_eq!(total.to_string(), "23.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod error;
pub mod money;
pub mod order;
pub mod pagination;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use context::RequestContext;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{LineItemRequest, OrderRequest, StockLedger};
pub use pagination::{Page, PageRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted on a single order line.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Maximum number of line entries in one order request.
pub const MAX_ORDER_LINES: usize = 100;

/// Largest storable amount in cents: ten significant digits, two of them
/// fractional (99,999,999.99).
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Maximum product name length in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for a configured page size.
pub const MAX_PAGE_SIZE: u32 = 100;
