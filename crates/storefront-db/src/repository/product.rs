//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Paginated listing and single lookup
//! - Catalog writes (insert, full replace, delete)
//! - Transaction-scoped stock decrement and batched lookup for order placement
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement Strategy                             │
//! │                                                                         │
//! │  ❌ WRONG: read, compare in Rust, write back                           │
//! │     SELECT stock ... ; UPDATE products SET stock = 3                   │
//! │     Two orders read 4, both write 3. One unit oversold.                │
//! │                                                                         │
//! │  ✅ CORRECT: one guarded statement                                     │
//! │     UPDATE products SET stock = stock - ?2                             │
//! │     WHERE id = ?1 AND stock >= ?2                                      │
//! │                                                                         │
//! │  rows_affected = 1 → Applied                                           │
//! │  rows_affected = 0 → look at the row: Missing or Insufficient          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository has no concurrency control of its own. Callers provide
//! the transaction.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{Page, PageRequest, Product, ProductDraft};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, stock, created_at, updated_at";

/// Outcome of a guarded stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was reduced.
    Applied,
    /// The product exists but has only `remaining` units.
    Insufficient { remaining: i64 },
    /// No product with that id.
    Missing,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.list_products(PageRequest::default()).await?;
/// let product = repo.get_product("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with `DbError::NotFound`.
    pub async fn get_product(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists one page of products ordered by id.
    pub async fn list_products(&self, page: PageRequest) -> DbResult<Page<Product>> {
        debug!(page = page.page(), page_size = page.page_size(), "Listing products");

        let count = self.count().await?;
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(page, count, products))
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Catalog Writes
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - ID already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Replaces every editable field of an existing product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as stored after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(draft.price_cents)
        .bind(draft.stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that no order references.
    ///
    /// Order items keep their product (`ON DELETE RESTRICT`), so history
    /// always resolves.
    ///
    /// ## Returns
    /// * `Ok(())` - Product removed
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::InUse)` - At least one order item references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::InUse {
                    entity: "Product".to_string(),
                    id: id.to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    // =========================================================================
    // Transaction-Scoped Operations
    // =========================================================================

    /// Reduces stock by `amount` inside the caller's transaction.
    ///
    /// Never lets stock go negative. On the first write of a transaction
    /// this statement also takes SQLite's write lock.
    pub async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: &str,
        amount: i64,
    ) -> DbResult<StockDecrement> {
        debug!(id = %id, amount = amount, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(StockDecrement::Applied);
        }

        let remaining: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match remaining {
            Some(remaining) => StockDecrement::Insufficient { remaining },
            None => StockDecrement::Missing,
        })
    }

    /// Loads several products in one query inside the caller's transaction.
    ///
    /// Missing ids are simply absent from the result.
    pub async fn get_many(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        ids: &[String],
    ) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&mut **tx)
            .await?;

        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
