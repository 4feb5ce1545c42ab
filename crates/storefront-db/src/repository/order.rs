//! # Order Repository
//!
//! Persistence and identity-scoped reads for orders.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Assembling a Page of Orders                          │
//! │                                                                         │
//! │  RequestContext { identity: "alice", privileged: false }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Query 1: headers                                                      │
//! │    SELECT ... FROM orders WHERE owner_id = 'alice'                     │
//! │    ORDER BY created_at DESC, rowid DESC LIMIT 10 OFFSET 0              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Query 2: every item of those orders, joined to its product            │
//! │    SELECT ... FROM order_items JOIN products                           │
//! │    WHERE order_id IN (o1, o2, ...)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Group items by order_id, attach to headers                            │
//! │                                                                         │
//! │  Two queries per page, however many items.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Staff contexts drop the `owner_id` filter. A customer asking for someone
//! else's order gets `None`, exactly as if the id did not exist.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{Order, OrderItem, Page, PageRequest, Product, RequestContext};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    owner_id: String,
    total_price_cents: i64,
    created_at: DateTime<Utc>,
}

/// One order item joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
    product_name: String,
    product_description: String,
    product_price_cents: i64,
    product_stock: i64,
    product_created_at: DateTime<Utc>,
    product_updated_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product: Product {
                id: row.product_id.clone(),
                name: row.product_name,
                description: row.product_description,
                price_cents: row.product_price_cents,
                stock: row.product_stock,
                created_at: row.product_created_at,
                updated_at: row.product_updated_at,
            },
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        }
    }
}

const ORDER_COLUMNS: &str = "id, owner_id, total_price_cents, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes an order header and all of its items inside the caller's
    /// transaction.
    pub async fn insert(&self, tx: &mut Transaction<'_, Sqlite>, order: &Order) -> DbResult<()> {
        debug!(
            order_id = %order.id,
            owner_id = %order.owner_id,
            items = order.items.len(),
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (id, owner_id, total_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order.id)
        .bind(&order.owner_id)
        .bind(order.total_price_cents)
        .bind(order.created_at)
        .execute(&mut **tx)
        .await?;

        if order.items.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) ",
        );
        query.push_values(&order.items, |mut row, item| {
            row.push_bind(&item.id)
                .push_bind(&item.order_id)
                .push_bind(&item.product_id)
                .push_bind(item.quantity)
                .push_bind(item.unit_price_cents);
        });
        query.build().execute(&mut **tx).await?;

        Ok(())
    }

    /// Lists the orders visible to `ctx`, newest first.
    pub async fn list_orders(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> DbResult<Page<Order>> {
        debug!(
            identity = %ctx.identity,
            privileged = ctx.privileged,
            page = page.page(),
            "Listing orders"
        );

        // Count, headers and items from one read snapshot
        let mut tx = self.pool.begin().await?;

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
        push_visibility(&mut count_query, ctx);
        let count: i64 = count_query
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;

        let mut header_query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_visibility(&mut header_query, ctx);
        header_query
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let headers: Vec<OrderRow> = header_query
            .build_query_as()
            .fetch_all(&mut *tx)
            .await?;

        let orders = attach_items(&mut tx, headers).await?;
        tx.commit().await?;

        Ok(Page::new(page, count, orders))
    }

    /// Fetches one order if `ctx` may see it.
    pub async fn get_order(&self, ctx: &RequestContext, id: &str) -> DbResult<Option<Order>> {
        debug!(order_id = %id, identity = %ctx.identity, "Fetching order");

        let mut tx = self.pool.begin().await?;

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_visibility(&mut query, ctx);
        query
            .push(if ctx.privileged { " WHERE " } else { " AND " })
            .push("id = ")
            .push_bind(id);
        let header: Option<OrderRow> = query.build_query_as().fetch_optional(&mut *tx).await?;

        let order = match header {
            Some(header) => attach_items(&mut tx, vec![header]).await?.pop(),
            None => None,
        };
        tx.commit().await?;

        Ok(order)
    }

    /// Counts orders visible to `ctx`.
    pub async fn count(&self, ctx: &RequestContext) -> DbResult<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
        push_visibility(&mut query, ctx);
        let count: i64 = query.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Adds the owner filter for non-privileged callers.
fn push_visibility<'a>(query: &mut QueryBuilder<'a, Sqlite>, ctx: &'a RequestContext) {
    if !ctx.privileged {
        query.push(" WHERE owner_id = ").push_bind(&ctx.identity);
    }
}

/// Loads every item for `headers` in one joined query and builds orders,
/// keeping header order.
async fn attach_items(
    conn: &mut SqliteConnection,
    headers: Vec<OrderRow>,
) -> DbResult<Vec<Order>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            oi.id,
            oi.order_id,
            oi.product_id,
            oi.quantity,
            oi.unit_price_cents,
            p.name AS product_name,
            p.description AS product_description,
            p.price_cents AS product_price_cents,
            p.stock AS product_stock,
            p.created_at AS product_created_at,
            p.updated_at AS product_updated_at
        FROM order_items oi
        INNER JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id IN (
        "#,
    );
    let mut separated = query.separated(", ");
    for header in &headers {
        separated.push_bind(header.id.clone());
    }
    separated.push_unseparated(") ORDER BY oi.rowid");

    let rows: Vec<OrderItemRow> = query.build_query_as().fetch_all(&mut *conn).await?;

    let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        items_by_order
            .entry(row.order_id.clone())
            .or_default()
            .push(row.into());
    }

    Ok(headers
        .into_iter()
        .map(|header| Order {
            items: items_by_order.remove(&header.id).unwrap_or_default(),
            id: header.id,
            owner_id: header.owner_id,
            total_price_cents: header.total_price_cents,
            created_at: header.created_at,
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use storefront_core::ProductDraft;

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = ProductDraft {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price_cents: 1000,
            stock: 100,
        }
        .into_product(Utc::now());
        db.products().insert(&product).await.unwrap();
        (db, product)
    }

    fn order_for(owner: &str, product: &Product, quantity: i64, at: DateTime<Utc>) -> Order {
        let id = uuid::Uuid::new_v4().to_string();
        Order {
            id: id.clone(),
            owner_id: owner.to_string(),
            total_price_cents: product.price_cents * quantity,
            created_at: at,
            items: vec![OrderItem {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: id,
                product_id: product.id.clone(),
                quantity,
                unit_price_cents: product.price_cents,
                product: product.clone(),
            }],
        }
    }

    async fn persist(db: &Database, order: &Order) {
        let mut tx = db.pool().begin().await.unwrap();
        db.orders().insert(&mut tx, order).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let (db, product) = setup().await;
        let order = order_for("alice", &product, 2, Utc::now());
        persist(&db, &order).await;

        let loaded = db
            .orders()
            .get_order(&RequestContext::customer("alice"), &order.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.id, order.id);
        assert_eq!(loaded.total_price_cents, 2000);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].product.name, "Widget");
        assert_eq!(loaded.items[0].unit_price_cents, 1000);
    }

    #[tokio::test]
    async fn test_foreign_order_is_invisible() {
        let (db, product) = setup().await;
        let order = order_for("bob", &product, 1, Utc::now());
        persist(&db, &order).await;

        let repo = db.orders();
        let alice = RequestContext::customer("alice");
        assert!(repo.get_order(&alice, &order.id).await.unwrap().is_none());
        assert_eq!(repo.list_orders(&alice, PageRequest::default()).await.unwrap().count, 0);

        let staff = RequestContext::staff("admin");
        assert!(repo.get_order(&staff, &order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_scoped() {
        let (db, product) = setup().await;
        let base = Utc::now();
        let older = order_for("alice", &product, 1, base - Duration::minutes(5));
        let newer = order_for("alice", &product, 3, base);
        let other = order_for("bob", &product, 1, base + Duration::minutes(1));
        persist(&db, &older).await;
        persist(&db, &newer).await;
        persist(&db, &other).await;

        let repo = db.orders();
        let page = repo
            .list_orders(&RequestContext::customer("alice"), PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<_> = page.results.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(page.count, 2);
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
        assert!(page.results.iter().all(|o| o.items.len() == 1));

        let all = repo
            .list_orders(&RequestContext::staff("admin"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.count, 3);
        assert_eq!(all.results[0].id, other.id);
        assert_eq!(repo.count(&RequestContext::staff("admin")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_same_timestamp_ties_break_by_insertion() {
        let (db, product) = setup().await;
        let at = Utc::now();
        let first = order_for("alice", &product, 1, at);
        let second = order_for("alice", &product, 1, at);
        persist(&db, &first).await;
        persist(&db, &second).await;

        let page = db
            .orders()
            .list_orders(&RequestContext::customer("alice"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.results[0].id, second.id);
        assert_eq!(page.results[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_orders_paginates() {
        let (db, product) = setup().await;
        let base = Utc::now();
        for i in 0..3 {
            persist(&db, &order_for("alice", &product, 1, base + Duration::seconds(i))).await;
        }

        let page = db
            .orders()
            .list_orders(
                &RequestContext::customer("alice"),
                PageRequest::new(2, 2).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.results.len(), 1);
        assert!(!page.has_next());
    }
}
