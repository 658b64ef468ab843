//! Branch Movement API Library
//!
//! This crate provides the core functionality for the branch-to-branch
//! stock movement service.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod uploads;

#[cfg(test)]
pub mod test_support;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub evidence_store: Arc<uploads::EvidenceStore>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn movement_service(&self) -> Arc<services::movements::MovementService> {
        self.services.movements.clone()
    }

    pub fn stock_service(&self) -> Arc<services::stock::StockService> {
        self.services.stock.clone()
    }

    pub fn product_service(&self) -> Arc<services::products::ProductService> {
        self.services.products.clone()
    }

    pub fn user_service(&self) -> Arc<services::users::UserService> {
        self.services.users.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: middleware_helpers::request_id::current_request_id()
                .map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All application routes, status and health included. The caller mounts
/// static uploads, Swagger UI, and middleware layers on top.
pub fn api_routes() -> Router<AppState> {
    let movements = Router::new()
        .route(
            "/movements",
            get(handlers::movements::list_movements).post(handlers::movements::create_movement),
        )
        .route(
            "/movements/:id",
            get(handlers::movements::get_movement)
                .delete(handlers::movements::delete_movement),
        )
        .route(
            "/movements/:id/start",
            put(handlers::movements::start_delivery),
        )
        .route(
            "/movements/:id/end",
            put(handlers::movements::finalize_delivery),
        )
        .route(
            "/movements/:id/cancel",
            post(handlers::movements::cancel_movement),
        )
        .route(
            "/movements/:id/status",
            patch(handlers::movements::update_status),
        );

    let catalog = Router::new()
        .route("/products", get(handlers::products::list_products))
        .route("/products/options", get(handlers::products::product_options))
        .route(
            "/products/:product_id/branches/:branch_id/quantity",
            get(handlers::products::quantity_at_branch),
        )
        .route("/branches/options", get(handlers::branches::branch_options));

    let users = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::register_user),
        )
        .route(
            "/users/:id/toggle-status",
            patch(handlers::users::toggle_user_status),
        )
        .route("/users/:id", delete(handlers::users::delete_user))
        .route("/auth/login", post(handlers::users::login));

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(movements)
        .merge(catalog)
        .merge(users)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "branchmove-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;
    use middleware_helpers::request_id::{scope_request_id, RequestId};

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response = scope_request_id(RequestId::new("meta-123"), async {
            ApiResponse::success("ok")
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response = scope_request_id(RequestId::new("meta-err"), async {
            ApiResponse::<()>::error("oops".into())
        })
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }
}
