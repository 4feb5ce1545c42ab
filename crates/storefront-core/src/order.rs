//! # Order Planning
//!
//! The pure half of order placement: request validation, running stock
//! reservations and order assembly. The database half lives in
//! `storefront-db`'s `OrderService`, which drives these pieces inside one
//! transaction.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  [{A,2},{B,1},{A,1}]                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  OrderRequest::new ─── empty / qty < 1 / bad id ──► ValidationError     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  for each line, in order:                                              │
//! │     decrement stock in tx ── fail ──► StockLedger::shortfall            │
//! │         │ ok                           (available, cumulative)          │
//! │         ▼                                                               │
//! │     StockLedger::reserve (A:2, B:1, A:3)                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  assemble_order ── snapshot prices, checked total ──► Order             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate product ids are separate lines. Each one is checked against
//! the running total reserved so far, never against the stock snapshot
//! taken before the request started.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Order, OrderItem, Product};
use crate::validation::{validate_quantity, validate_uuid};
use crate::{MAX_AMOUNT_CENTS, MAX_ORDER_LINES};

// =============================================================================
// Order Request
// =============================================================================

/// A single requested line: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A validated list of order lines.
///
/// Construction is the only validation step the engine needs before it
/// opens a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    items: Vec<LineItemRequest>,
}

impl OrderRequest {
    /// Validates raw line items.
    ///
    /// ## Rules
    /// - At least one line, at most `MAX_ORDER_LINES`
    /// - Each `product_id` is a UUID
    /// - Each `quantity` is within `1..=MAX_ITEM_QUANTITY`
    ///
    /// Errors name the offending line, e.g. `items[1].quantity`.
    pub fn new(items: Vec<LineItemRequest>) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }

        if items.len() > MAX_ORDER_LINES {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_ORDER_LINES as i64,
            });
        }

        for (i, item) in items.iter().enumerate() {
            validate_uuid(&format!("items[{i}].product_id"), &item.product_id)?;
            validate_quantity(&format!("items[{i}].quantity"), item.quantity)?;
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[LineItemRequest] {
        &self.items
    }

    /// Distinct product ids in first-seen order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.contains(&item.product_id) {
                seen.push(item.product_id.clone());
            }
        }
        seen
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Running per-product reservations for one order request.
///
/// The engine decrements stock line by line. The ledger remembers how much
/// each product has already been reduced by this request so a failure can
/// be reported in terms of the stock the customer originally saw.
#[derive(Debug, Default, Clone)]
pub struct StockLedger {
    reserved: HashMap<String, i64>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units of `product_id` reserved so far.
    pub fn reserved(&self, product_id: &str) -> i64 {
        self.reserved.get(product_id).copied().unwrap_or(0)
    }

    /// Records a successful decrement and returns the new running total.
    pub fn reserve(&mut self, product_id: &str, quantity: i64) -> i64 {
        let total = self.reserved.entry(product_id.to_string()).or_insert(0);
        *total += quantity;
        *total
    }

    /// Builds the error for a line that could not be satisfied.
    ///
    /// `remaining` is the stock observed after this request's earlier
    /// decrements.
    pub fn shortfall(&self, product_id: &str, quantity: i64, remaining: i64) -> CoreError {
        let already = self.reserved(product_id);
        CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available: remaining + already,
            requested: already + quantity,
        }
    }
}

// =============================================================================
// Order Assembly
// =============================================================================

/// Builds the order header and items from products read inside the
/// placing transaction.
///
/// Prices are copied from `products` into each item. The total is the
/// exact sum of `unit_price × quantity` and must fit the storable range.
pub fn assemble_order(
    ctx: &RequestContext,
    request: &OrderRequest,
    products: &HashMap<String, Product>,
    now: DateTime<Utc>,
) -> CoreResult<Order> {
    let order_id = uuid::Uuid::new_v4().to_string();
    let mut total = Money::zero();
    let mut items = Vec::with_capacity(request.items().len());

    for line in request.items() {
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let unit_price = product.price();
        total = unit_price
            .checked_mul_quantity(line.quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .filter(|t| t.cents() <= MAX_AMOUNT_CENTS)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total_price".to_string(),
                min: 0,
                max: MAX_AMOUNT_CENTS,
            })?;

        items.push(OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: unit_price.cents(),
            product: product.clone(),
        });
    }

    Ok(Order {
        id: order_id,
        owner_id: ctx.identity.clone(),
        total_price_cents: total.cents(),
        created_at: now,
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "00000000-0000-4000-8000-00000000000a";
    const B: &str = "00000000-0000-4000-8000-00000000000b";

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> HashMap<String, Product> {
        [product(A, 1000, 5), product(B, 350, 2)]
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect()
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(OrderRequest::new(vec![]).unwrap_err().field(), "items");

        let err = OrderRequest::new(vec![
            LineItemRequest::new(A, 1),
            LineItemRequest::new(B, 0),
        ])
        .unwrap_err();
        assert_eq!(err.field(), "items[1].quantity");

        let err = OrderRequest::new(vec![LineItemRequest::new("nope", 1)]).unwrap_err();
        assert_eq!(err.field(), "items[0].product_id");

        let too_many = vec![LineItemRequest::new(A, 1); MAX_ORDER_LINES + 1];
        assert_eq!(OrderRequest::new(too_many).unwrap_err().field(), "items");
    }

    #[test]
    fn test_product_ids_are_distinct_in_order() {
        let req = OrderRequest::new(vec![
            LineItemRequest::new(B, 1),
            LineItemRequest::new(A, 1),
            LineItemRequest::new(B, 1),
        ])
        .unwrap();
        assert_eq!(req.product_ids(), vec![B.to_string(), A.to_string()]);
    }

    #[test]
    fn test_ledger_running_totals() {
        // B starts at 2; the guarded decrement applies the first two lines
        let mut ledger = StockLedger::new();
        assert_eq!(ledger.reserve(B, 1), 1);
        assert_eq!(ledger.reserve(B, 1), 2);
        assert_eq!(ledger.reserved(B), 2);
        assert_eq!(ledger.reserved(A), 0);

        // third line finds 0 remaining
        match ledger.shortfall(B, 1, 0) {
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, B);
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(ledger.reserved(B), 2);
    }

    #[test]
    fn test_shortfall_reports_pre_request_stock() {
        let mut ledger = StockLedger::new();
        ledger.reserve(A, 3);

        // 2 left after this request's earlier lines, asking for 4 more
        let err = ledger.shortfall(A, 4, 2);
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 7, .. }
        ));
    }

    #[test]
    fn test_assemble_order_totals_and_snapshot() {
        let ctx = RequestContext::customer("alice");
        let req = OrderRequest::new(vec![
            LineItemRequest::new(A, 2),
            LineItemRequest::new(B, 1),
        ])
        .unwrap();

        let order = assemble_order(&ctx, &req, &catalog(), Utc::now()).unwrap();

        assert_eq!(order.total_price().to_string(), "23.50");
        assert_eq!(order.owner_id, "alice");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unit_price_cents, 1000);
        assert_eq!(order.items[1].unit_price_cents, 350);
        assert!(order.items.iter().all(|i| i.order_id == order.id));
    }

    #[test]
    fn test_assemble_order_missing_product() {
        let ctx = RequestContext::customer("alice");
        let missing = "00000000-0000-4000-8000-0000000000ff";
        let req = OrderRequest::new(vec![LineItemRequest::new(missing, 1)]).unwrap();

        let err = assemble_order(&ctx, &req, &catalog(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(id) if id == missing));
    }

    #[test]
    fn test_assemble_order_total_overflow() {
        let ctx = RequestContext::customer("alice");
        let mut products = catalog();
        products.insert(A.to_string(), product(A, MAX_AMOUNT_CENTS, 10_000));
        let req = OrderRequest::new(vec![LineItemRequest::new(A, 2)]).unwrap();

        let err = assemble_order(&ctx, &req, &products, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "total_price"
        ));
    }
}
