//! # Services
//!
//! Multi-repository workflows that own their transactions.
//!
//! - [`OrderService`](order::OrderService) - Atomic order placement and scoped order reads
//! - [`RetryPolicy`](retry::RetryPolicy) - Backoff for write-lock conflicts

pub mod order;
pub mod retry;
