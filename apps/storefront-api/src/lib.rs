//! # Storefront API
//!
//! JSON over HTTP in front of the catalog and the order engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront API Routes                           │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────────┐  ┌───────────────────────┐ │
//! │  │  health        │  │  products          │  │  orders (Bearer JWT)  │ │
//! │  │                │  │                    │  │                       │ │
//! │  │ • GET /health  │  │ • GET  list / one  │  │ • POST create         │ │
//! │  │ • GET /api/v1/ │  │ • POST / PUT staff │  │ • GET  list / one     │ │
//! │  └────────────────┘  └────────────────────┘  └───────────────────────┘ │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      AppState (Arc)                               │  │
//! │  │                                                                   │  │
//! │  │  Database (SQLite pool) · OrderService · JwtManager · ApiConfig  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `STOREFRONT_BIND_ADDR` - Listen address (default: 0.0.0.0:8000)
//! - `DATABASE_PATH` - SQLite file (default: ./storefront.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT verification
//! - `JWT_LIFETIME_SECS` - Lifetime of issued tokens (default: 3600)
//! - `PAGE_SIZE` - Results per page (default: 10)
//! - `ORDER_MAX_ATTEMPTS` - Order transaction attempts (default: 5)
//! - `ORDER_INITIAL_BACKOFF_MS` / `ORDER_MAX_BACKOFF_MS` - Retry delays (default: 25 / 500)

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

// Re-exports
pub use auth::{Caller, JwtManager};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::router;

use storefront_db::{Database, OrderService};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub orders: OrderService,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Arc<Self> {
        let orders = OrderService::new(db.clone()).with_retry_policy(config.retry_policy());
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

        Arc::new(AppState {
            db,
            orders,
            jwt,
            config,
        })
    }
}
