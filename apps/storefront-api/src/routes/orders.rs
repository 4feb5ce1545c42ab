//! # Order Routes
//!
//! Every handler here takes a [`Caller`]; the caller's context is passed
//! straight into the order service, which enforces visibility.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{LineItemRequest, Order, OrderItem};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::routes::products::ProductBody;
use crate::routes::{PageBody, PageParams};
use crate::AppState;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderBody {
    pub id: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub total_price: String,
    pub items: Vec<OrderItemBody>,
}

/// `unit_price` is the price captured when the order was placed; the nested
/// product shows the catalog as it is now.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemBody {
    pub id: String,
    pub product: ProductBody,
    pub quantity: i64,
    pub unit_price: String,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        OrderBody {
            total_price: order.total_price().to_decimal_string(),
            id: order.id,
            owner: order.owner_id,
            created_at: order.created_at,
            items: order.items.into_iter().map(OrderItemBody::from).collect(),
        }
    }
}

impl From<OrderItem> for OrderItemBody {
    fn from(item: OrderItem) -> Self {
        OrderItemBody {
            unit_price: item.unit_price().to_decimal_string(),
            id: item.id,
            product: item.product.into(),
            quantity: item.quantity,
        }
    }
}

/// Body of `POST /api/v1/orders`. A missing `items` key is reported the same
/// way as an empty list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/v1/orders`
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    payload: Result<Json<CreateOrderInput>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderBody>), ApiError> {
    let Json(input) = payload?;
    let order = state.orders.create_order(&ctx, &input.items).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// `GET /api/v1/orders?page=N`
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<PageBody<OrderBody>>, ApiError> {
    let Query(params) = params?;
    let request = params.to_request(state.config.page_size)?;

    let page = state.orders.list_orders(&ctx, request).await?;
    Ok(Json(page.map(OrderBody::from).into()))
}

/// `GET /api/v1/orders/{id}`
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderBody>, ApiError> {
    let order = state.orders.get_order(&ctx, &id).await?;
    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{seed_product, send, test_app, token};

    #[tokio::test]
    async fn test_orders_require_token() {
        let (app, _) = test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/orders", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some("not-a-jwt"),
            Some(json!({ "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_place_order_and_read_back() {
        let (app, state) = test_app().await;
        let a = seed_product(&state, "A", 1000, 5).await;
        let b = seed_product(&state, "B", 350, 2).await;
        let alice = token(&state, "alice", false);

        let (status, order) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [
                { "product_id": a, "quantity": 2 },
                { "product_id": b, "quantity": 1 },
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["total_price"], "23.50");
        assert_eq!(order["owner"], "alice");
        assert_eq!(order["items"][0]["unit_price"], "10.00");
        assert_eq!(order["items"][0]["product"]["stock"], 3);
        assert_eq!(order["items"][1]["quantity"], 1);

        let id = order["id"].as_str().unwrap();
        let (status, fetched) =
            send(&app, Method::GET, &format!("/api/v1/orders/{}", id), Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["total_price"], "23.50");
        assert_eq!(fetched["items"].as_array().unwrap().len(), 2);

        let (status, page) = send(&app, Method::GET, "/api/v1/orders", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["count"], 1);
        assert_eq!(page["results"][0]["id"], id);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_400() {
        let (app, state) = test_app().await;
        let b = seed_product(&state, "B", 350, 2).await;
        let alice = token(&state, "alice", false);

        let (status, err) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": b, "quantity": 3 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INSUFFICIENT_STOCK");
        assert!(err["message"].as_str().unwrap().contains("2 available, 3 requested"));

        assert_eq!(state.db.products().get_product(&b).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_missing_product_is_404() {
        let (app, state) = test_app().await;
        let a = seed_product(&state, "A", 1000, 5).await;
        let alice = token(&state, "alice", false);

        let (status, err) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [
                { "product_id": a, "quantity": 1 },
                { "product_id": "00000000-0000-4000-8000-000000000000", "quantity": 1 },
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "PRODUCT_NOT_FOUND");

        // first line rolled back with the rest
        assert_eq!(state.db.products().get_product(&a).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_validation_errors_name_field() {
        let (app, state) = test_app().await;
        let a = seed_product(&state, "A", 1000, 5).await;
        let alice = token(&state, "alice", false);

        let (status, err) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["field"], "items");

        let (status, err) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": a, "quantity": 0 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["field"], "items[0].quantity");

        let (status, err) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": a, "quantity": "two" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_foreign_orders_invisible() {
        let (app, state) = test_app().await;
        let a = seed_product(&state, "A", 1000, 5).await;
        let alice = token(&state, "alice", false);
        let bob = token(&state, "bob", false);
        let staff = token(&state, "admin", true);

        let (_, order) = send(
            &app,
            Method::POST,
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": a, "quantity": 1 }] })),
        )
        .await;
        let uri = format!("/api/v1/orders/{}", order["id"].as_str().unwrap());

        let (status, err) = send(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "NOT_FOUND");

        let (_, page) = send(&app, Method::GET, "/api/v1/orders", Some(&bob), None).await;
        assert_eq!(page["count"], 0);

        let (status, _) = send(&app, Method::GET, &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, page) = send(&app, Method::GET, "/api/v1/orders", Some(&staff), None).await;
        assert_eq!(page["count"], 1);
    }
}
