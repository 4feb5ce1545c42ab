//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Kinds of Repository Method                       │
//! │                                                                         │
//! │  Pool-scoped (&self only)            Transaction-scoped (&mut tx)      │
//! │  ─────────────────────────           ───────────────────────────       │
//! │  ProductRepository::get_product      ProductRepository::decrement_stock│
//! │  ProductRepository::list_products    ProductRepository::get_many       │
//! │  ProductRepository::insert/update    OrderRepository::insert           │
//! │  OrderRepository::list_orders                                          │
//! │  OrderRepository::get_order                                            │
//! │                                                                         │
//! │  Transaction-scoped methods never commit. The caller that began the    │
//! │  transaction (OrderService) decides commit or rollback.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog store
//! - [`OrderRepository`](order::OrderRepository) - Order persistence and scoped reads

pub mod order;
pub mod product;
