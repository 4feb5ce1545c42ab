//! # Order Service
//!
//! Places orders atomically and serves identity-scoped order reads.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order(ctx, items)                             │
//! │                                                                         │
//! │  OrderRequest::new(items)  ── invalid ──► Core(Validation)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line:                                                        │
//! │     UPDATE products SET stock = stock - q WHERE id = ? AND stock >= q  │
//! │       │   first UPDATE takes the write lock before any stock is read   │
//! │       ├── Missing ─────────► ProductNotFound     ─┐                    │
//! │       ├── Insufficient ────► InsufficientStock   ─┤                    │
//! │       ▼ Applied                                   │                    │
//! │  SELECT products (one query) for price snapshot   │                    │
//! │       │                                           │                    │
//! │       ▼                                           ▼                    │
//! │  INSERT orders + order_items              drop tx = ROLLBACK           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  SQLITE_BUSY / pool timeout anywhere ──► backoff, start over           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite has one writer at a time. Because every placement writes before
//! it reads, two placements touching the same product are fully
//! serialized and can never both spend the same unit.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::product::StockDecrement;
use crate::service::retry::RetryPolicy;
use storefront_core::order::assemble_order;
use storefront_core::{
    CoreError, LineItemRequest, Order, OrderRequest, Page, PageRequest, RequestContext,
    StockLedger, ValidationError,
};

// =============================================================================
// Errors
// =============================================================================

/// Everything order placement and order reads can fail with.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Validation, missing product, insufficient stock, missing order.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Every attempt hit a write-lock conflict.
    #[error("Order could not be placed after {attempts} attempts due to concurrent writes")]
    ConflictRetryExhausted { attempts: u32 },

    /// Non-transient storage failure.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<ValidationError> for OrderError {
    fn from(err: ValidationError) -> Self {
        OrderError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Storage(DbError::from(err))
    }
}

impl OrderError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderError::Storage(e) if e.is_transient())
    }
}

// =============================================================================
// Service
// =============================================================================

/// The order transaction engine plus the order query layer.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    retry: RetryPolicy,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the conflict retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Places an order for `ctx` atomically.
    ///
    /// Either the whole order commits, with every stock decrement and item
    /// row, or nothing in the store changes.
    ///
    /// ## Errors
    /// * `Core(Validation)` - empty request, bad quantity, bad id, total too large
    /// * `Core(ProductNotFound)` - first unknown product id, in request order
    /// * `Core(InsufficientStock)` - first line whose running total exceeds stock
    /// * `ConflictRetryExhausted` - lock contention outlasted the retry policy
    /// * `Storage` - any other database failure
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        items: &[LineItemRequest],
    ) -> Result<Order, OrderError> {
        let request = OrderRequest::new(items.to_vec())?;
        let mut backoff = self.retry.backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.place(ctx, &request).await {
                Ok(order) => {
                    info!(
                        order_id = %order.id,
                        owner_id = %order.owner_id,
                        total_cents = order.total_price_cents,
                        items = order.items.len(),
                        attempt,
                        "Order placed"
                    );
                    return Ok(order);
                }
                Err(err) if err.is_transient() => {
                    if attempt >= self.retry.max_attempts {
                        warn!(attempts = attempt, error = %err, "Giving up on order placement");
                        return Err(OrderError::ConflictRetryExhausted { attempts: attempt });
                    }

                    let delay = self.retry.next_delay(&mut backoff);
                    warn!(attempt, ?delay, error = %err, "Write conflict, retrying order");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    debug!(error = %err, "Order rejected");
                    return Err(err);
                }
            }
        }
    }

    /// One attempt at the placement transaction.
    ///
    /// Any early return drops `tx`, which rolls it back.
    async fn place(&self, ctx: &RequestContext, request: &OrderRequest) -> Result<Order, OrderError> {
        let products = self.db.products();
        let mut tx = self.db.pool().begin().await?;
        let mut ledger = StockLedger::new();

        for line in request.items() {
            match products
                .decrement_stock(&mut tx, &line.product_id, line.quantity)
                .await?
            {
                StockDecrement::Applied => {
                    ledger.reserve(&line.product_id, line.quantity);
                }
                StockDecrement::Insufficient { remaining } => {
                    return Err(ledger.shortfall(&line.product_id, line.quantity, remaining).into());
                }
                StockDecrement::Missing => {
                    return Err(CoreError::ProductNotFound(line.product_id.clone()).into());
                }
            }
        }

        let snapshot: HashMap<_, _> = products
            .get_many(&mut tx, &request.product_ids())
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let order = assemble_order(ctx, request, &snapshot, Utc::now())?;
        self.db.orders().insert(&mut tx, &order).await?;
        tx.commit().await?;

        Ok(order)
    }

    /// Lists orders visible to `ctx`, newest first.
    pub async fn list_orders(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderError> {
        Ok(self.db.orders().list_orders(ctx, page).await?)
    }

    /// Fetches one order. Orders the caller may not see are reported as
    /// not found.
    pub async fn get_order(&self, ctx: &RequestContext, id: &str) -> Result<Order, OrderError> {
        self.db
            .orders()
            .get_order(ctx, id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
