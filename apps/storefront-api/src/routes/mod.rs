//! # HTTP Routes
//!
//! ```text
//! GET  /health                  liveness + DB ping
//! GET  /api/v1/                 API root with links
//! GET  /api/v1/products         ?page=N, anonymous
//! POST /api/v1/products         staff only
//! GET  /api/v1/products/{id}    anonymous
//! PUT  /api/v1/products/{id}    staff only
//! DELETE /api/v1/products/{id}  staff only, 409 while ordered
//! POST /api/v1/orders           Bearer token, 201
//! GET  /api/v1/orders           ?page=N, caller-scoped
//! GET  /api/v1/orders/{id}      caller-scoped, 404 otherwise
//! ```

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use storefront_core::{Page, PageRequest, ValidationError};

use crate::error::ApiError;
use crate::AppState;

pub mod health;
pub mod orders;
pub mod products;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1", get(health::api_root))
        .route("/api/v1/", get(health::api_root))
        .route(
            "/api/v1/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/v1/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/v1/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/v1/orders/{id}", get(orders::get_order))
        .with_state(state)
}

// =============================================================================
// Pagination
// =============================================================================

/// `?page=N` query parameter. Kept as text so a bad value is reported as a
/// validation error on `page` rather than a generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn to_request(&self, page_size: u32) -> Result<PageRequest, ApiError> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw.parse::<u32>().map_err(|_| ValidationError::InvalidFormat {
                field: "page".to_string(),
                reason: "must be a positive integer".to_string(),
            })?,
        };

        Ok(PageRequest::new(page, page_size)?)
    }
}

/// A page plus neighbouring page numbers.
#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    #[serde(flatten)]
    pub page: Page<T>,
    pub next: Option<u32>,
    pub previous: Option<u32>,
}

impl<T> From<Page<T>> for PageBody<T> {
    fn from(page: Page<T>) -> Self {
        let next = page.has_next().then(|| page.page + 1);
        let previous = page.has_previous().then(|| page.page - 1);
        PageBody {
            page,
            next,
            previous,
        }
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use storefront_core::ProductDraft;
    use storefront_db::{Database, DbConfig};
    use tower::ServiceExt;

    use crate::{router, ApiConfig, AppState};

    pub async fn test_app() -> (Router, Arc<AppState>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        let state = AppState::new(db, config);
        (router(state.clone()), state)
    }

    pub fn token(state: &AppState, sub: &str, staff: bool) -> String {
        state.jwt.issue(sub, sub, staff).unwrap()
    }

    pub async fn seed_product(state: &AppState, name: &str, price_cents: i64, stock: i64) -> String {
        let product = ProductDraft {
            name: name.to_string(),
            description: String::new(),
            price_cents,
            stock,
        }
        .into_product(chrono::Utc::now());
        state.db.products().insert(&product).await.unwrap();
        product.id
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
