use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::user::{self, UserProfile};
use crate::errors::ServiceError;
use crate::services::users::RegisterUser;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "profile": "driver",
    "name": "Ana Souza",
    "document": "12345678900",
    "full_address": "Av. Central 100, Sao Paulo",
    "email": "ana@example.com",
    "password": "s3cret"
}))]
pub struct RegisterUserRequest {
    /// admin, branch, or driver (legacy: filial, motorista)
    pub profile: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub document: String,
    #[validate(length(min = 1))]
    pub full_address: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub profile: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub profile: UserProfile,
    pub name: String,
    pub document: String,
    pub full_address: String,
    pub email: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            profile: model.profile,
            name: model.name,
            document: model.document,
            full_address: model.full_address,
            email: model.email,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or document already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
    let profile = payload.profile.parse::<UserProfile>()?;

    let created = state
        .user_service()
        .register(RegisterUser {
            profile,
            name: payload.name,
            document: payload.document,
            full_address: payload.full_address,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResponse::from(created))),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Unknown email, wrong password, or deactivated account", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let outcome = state
        .user_service()
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(ApiResponse::success(LoginResponse {
        token: outcome.token,
        name: outcome.name,
        profile: outcome.profile,
    })))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All registered users", body = ApiResponse<Vec<UserResponse>>)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserResponse>> {
    let users = state.user_service().list().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/toggle-status",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Activation flag flipped", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<UserResponse> {
    let updated = state.user_service().toggle_status(id).await?;
    Ok(Json(ApiResponse::success(UserResponse::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    state.user_service().delete(id).await?;
    Ok(Json(ApiResponse::success(
        json!({ "message": "User deleted successfully." }),
    )))
}
