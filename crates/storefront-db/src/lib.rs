//! # storefront-db: Database Layer for the Storefront
//!
//! SQLite storage for products and orders, and the transaction that turns
//! an order request into committed rows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /api/v1/orders)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ OrderService  │───►│  Repositories │───►│   Database   │  │   │
//! │  │   │ (service/)    │    │ ProductRepo   │    │  (pool.rs)   │  │   │
//! │  │   │ tx + retry    │    │ OrderRepo     │    │  SqlitePool  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite Database (./storefront.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and order repositories
//! - [`service`] - Order placement engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_core::{LineItemRequest, RequestContext};
//! use storefront_db::{Database, DbConfig, OrderService};
//!
//! let db = Database::new(DbConfig::new("./storefront.db")).await?;
//! let orders = OrderService::new(db.clone());
//!
//! let ctx = RequestContext::customer("alice");
//! let order = orders
//!     .create_order(&ctx, &[LineItemRequest::new(product_id, 2)])
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::product::{ProductRepository, StockDecrement};
pub use service::order::{OrderError, OrderService};
pub use service::retry::RetryPolicy;
