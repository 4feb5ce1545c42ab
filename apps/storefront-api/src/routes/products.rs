//! # Product Routes
//!
//! Anonymous catalog reads and staff-only catalog writes. Products that
//! orders reference can't be deleted.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::validation::{parse_price, validate_product_draft};
use storefront_core::{Product, ProductDraft};
use tracing::info;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::routes::{PageBody, PageParams};
use crate::AppState;

// =============================================================================
// Wire Types
// =============================================================================

/// A product as clients see it. Prices are decimal strings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductBody {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductBody {
    fn from(product: Product) -> Self {
        ProductBody {
            price: product.price().to_decimal_string(),
            id: product.id,
            name: product.name,
            description: product.description,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Prices arrive either as `"10.00"` or as a bare JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    fn as_text(&self) -> String {
        match self {
            PriceInput::Text(s) => s.trim().to_string(),
            PriceInput::Number(n) => n.to_string(),
        }
    }
}

/// Body of `POST` and `PUT`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: PriceInput,
    pub stock: i64,
}

impl ProductInput {
    fn into_draft(self) -> Result<ProductDraft, ApiError> {
        let price = parse_price("price", &self.price.as_text())?;
        let draft = ProductDraft {
            name: self.name,
            description: self.description,
            price_cents: price.cents(),
            stock: self.stock,
        };
        validate_product_draft(&draft)?;
        Ok(draft)
    }
}

fn require_staff(caller: &Caller) -> Result<(), ApiError> {
    if caller.0.privileged {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/v1/products?page=N`
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<PageBody<ProductBody>>, ApiError> {
    let Query(params) = params?;
    let request = params.to_request(state.config.page_size)?;

    let page = state.db.products().list_products(request).await?;
    Ok(Json(page.map(ProductBody::from).into()))
}

/// `GET /api/v1/products/{id}`
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductBody>, ApiError> {
    let product = state.db.products().get_product(&id).await?;
    Ok(Json(product.into()))
}

/// `POST /api/v1/products`
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductBody>), ApiError> {
    require_staff(&caller)?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;

    let product = state
        .db
        .products()
        .insert(&draft.into_product(Utc::now()))
        .await?;

    info!(product_id = %product.id, by = %caller.0.identity, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /api/v1/products/{id}`
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    caller: Caller,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductBody>, ApiError> {
    require_staff(&caller)?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;

    let product = state.db.products().update(&id, &draft).await?;

    info!(product_id = %product.id, by = %caller.0.identity, "Product updated");
    Ok(Json(product.into()))
}

/// `DELETE /api/v1/products/{id}`
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<StatusCode, ApiError> {
    require_staff(&caller)?;

    state.db.products().delete(&id).await?;

    info!(product_id = %id, by = %caller.0.identity, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
