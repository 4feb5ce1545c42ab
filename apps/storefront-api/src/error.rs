//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Storefront                             │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  POST /api/v1/orders                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation? ─── ValidationError ───────────────┐               │  │
//! │  │         │                                        │               │  │
//! │  │         ▼                                        ▼               │  │
//! │  │  Business rule? ─── CoreError / OrderError ──► ApiError ───────►│  │
//! │  │         │                                        ▲               │  │
//! │  │         ▼                                        │               │  │
//! │  │  Storage? ─── DbError (logged, generic text) ────┘               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 400 {"code":"INSUFFICIENT_STOCK","message":"..."}                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::{CoreError, ValidationError};
use storefront_db::{DbError, OrderError};

/// Error body returned by every failing endpoint.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "items[0].quantity must be positive",
///   "field": "items[0].quantity"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Offending request field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// A product named in the request does not exist (404)
    ProductNotFound,

    /// Not enough stock for the requested quantity (400)
    InsufficientStock,

    /// Resource not found (404)
    NotFound,

    /// Request clashes with stored data (409)
    Conflict,

    /// Write contention outlasted the retry policy (503)
    ConflictRetryExhausted,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::ProductNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ConflictRetryExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error without a specific field.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return (status, [(header::RETRY_AFTER, "1")], Json(self)).into_response();
        }
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Converts validation errors, keeping the offending field.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            field: Some(err.field().to_string()),
            message: err.to_string(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::new(
                ErrorCode::ProductNotFound,
                format!("Product not found: {}", id),
            ),
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product_id, available, requested
                ),
            ),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts order engine errors to API errors.
impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Core(e) => e.into(),
            OrderError::ConflictRetryExhausted { attempts } => {
                tracing::warn!(attempts, "Order rejected after lock contention");
                ApiError::new(
                    ErrorCode::ConflictRetryExhausted,
                    "The store is busy, please retry the order",
                )
            }
            OrderError::Storage(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                tracing::error!("Unique violation on {}: {}", field, value);
                ApiError::new(ErrorCode::Conflict, "Resource already exists")
            }
            DbError::InUse { entity, id } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} is referenced by existing orders", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::Busy(e) => {
                tracing::warn!("Database busy: {}", e);
                ApiError::new(
                    ErrorCode::ConflictRetryExhausted,
                    "The store is busy, please retry",
                )
            }
            DbError::PoolExhausted => {
                tracing::warn!("Database pool exhausted");
                ApiError::new(
                    ErrorCode::ConflictRetryExhausted,
                    "The store is busy, please retry",
                )
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Malformed or mistyped JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_keeps_field() {
        let err: ApiError = ValidationError::MustBePositive {
            field: "items[0].quantity".to_string(),
        }
        .into();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("items[0].quantity"));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field"], "items[0].quantity");
    }

    #[test]
    fn test_core_error_statuses() {
        let missing: ApiError = CoreError::ProductNotFound("p".into()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.code, ErrorCode::ProductNotFound);

        let short: ApiError = CoreError::InsufficientStock {
            product_id: "b".into(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(short.status(), StatusCode::BAD_REQUEST);
        assert!(short.message.contains("2 available, 3 requested"));

        let order: ApiError = CoreError::OrderNotFound("o".into()).into();
        assert_eq!(order.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_conflict_is_503_with_retry_after() {
        let err: ApiError = OrderError::ConflictRetryExhausted { attempts: 5 }.into();
        assert_eq!(err.code, ErrorCode::ConflictRetryExhausted);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[test]
    fn test_unique_violation_hides_schema() {
        let err: ApiError = DbError::UniqueViolation {
            field: "products.id".into(),
            value: "unknown".into(),
        }
        .into();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(!err.message.contains("products"));
    }

    #[test]
    fn test_in_use_is_conflict() {
        let err: ApiError = DbError::InUse {
            entity: "Product".into(),
            id: "p1".into(),
        }
        .into();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(serde_json::to_value(&err).unwrap()["code"], "CONFLICT");
    }

    #[test]
    fn test_storage_details_hidden() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("field").is_none());
    }
}
