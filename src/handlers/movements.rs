use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::movement::{self, MovementStatus};
use crate::errors::ServiceError;
use crate::services::movements::{CreateMovement, MovementDetail};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovementListQuery {
    /// Optional status filter (canonical or legacy label)
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "origin_branch_id": 1,
    "destination_branch_id": 2,
    "product_id": 42,
    "quantity": 4,
    "status": "created",
    "created_at": "2024-12-09T10:30:00Z",
    "updated_at": "2024-12-09T10:30:00Z"
}))]
pub struct MovementSummary {
    pub id: i32,
    pub origin_branch_id: i32,
    pub destination_branch_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Lifecycle status (created, in_transit, collection_finished, finalized, cancelled)
    #[schema(example = "created")]
    pub status: MovementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<movement::Model> for MovementSummary {
    fn from(model: movement::Model) -> Self {
        Self {
            id: model.id,
            origin_branch_id: model.origin_branch_id,
            destination_branch_id: model.destination_branch_id,
            product_id: model.product_id,
            quantity: model.quantity,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRef {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchRef {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: i32,
    /// Free-text description of the lifecycle step
    #[schema(example = "Driver Ana started delivery")]
    pub description: String,
    /// Absolute URL of the evidence file, when one was attached
    pub file: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Movement joined with product, branches, and its ordered audit trail.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovementDetailResponse {
    pub id: i32,
    pub product: ProductRef,
    pub quantity: i32,
    pub status: MovementStatus,
    pub origin: BranchRef,
    pub destination: BranchRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<HistoryEntryResponse>,
}

impl MovementDetailResponse {
    fn build(detail: MovementDetail, base_url: &str) -> Self {
        let MovementDetail {
            movement,
            product,
            origin,
            destination,
            history,
        } = detail;
        Self {
            id: movement.id,
            product: ProductRef {
                id: product.id,
                name: product.name,
                image_url: product.image_url,
            },
            quantity: movement.quantity,
            status: movement.status,
            origin: branch_ref(origin),
            destination: branch_ref(destination),
            created_at: movement.created_at,
            updated_at: movement.updated_at,
            history: history
                .into_iter()
                .map(|entry| HistoryEntryResponse {
                    id: entry.id,
                    description: entry.status_label,
                    file: entry
                        .evidence_file
                        .map(|reference| resolve_file_url(base_url, &reference)),
                    timestamp: entry.timestamp,
                })
                .collect(),
        }
    }
}

fn branch_ref(model: crate::entities::branch::Model) -> BranchRef {
    BranchRef {
        id: model.id,
        name: model.name,
        latitude: model.latitude,
        longitude: model.longitude,
    }
}

/// Resolves a stored relative evidence reference into an absolute URL.
fn resolve_file_url(base_url: &str, reference: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "origin_branch_id": 1,
    "destination_branch_id": 2,
    "product_id": 42,
    "quantity": 4
}))]
pub struct CreateMovementRequest {
    pub origin_branch_id: i32,
    pub destination_branch_id: i32,
    pub product_id: i32,
    /// Units to transfer; must not exceed origin stock
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "status": "cancelled" }))]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvidenceUploadResponse {
    pub message: String,
    pub file_path: String,
}

#[utoipa::path(
    post,
    path = "/movements",
    request_body = CreateMovementRequest,
    responses(
        (status = 201, description = "Movement created", body = ApiResponse<MovementSummary>),
        (status = 400, description = "Validation failure or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product or branch", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn create_movement(
    State(state): State<AppState>,
    Json(payload): Json<CreateMovementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MovementSummary>>), ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let command = CreateMovement {
        origin_branch_id: payload.origin_branch_id,
        destination_branch_id: payload.destination_branch_id,
        product_id: payload.product_id,
        quantity: payload.quantity,
    };

    let created = state.movement_service().create_movement(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MovementSummary::from(created))),
    ))
}

#[utoipa::path(
    get,
    path = "/movements",
    params(MovementListQuery),
    responses(
        (status = 200, description = "Movements listed with details and history", body = ApiResponse<Vec<MovementDetailResponse>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> ApiResult<Vec<MovementDetailResponse>> {
    let status = query
        .status
        .map(|raw| raw.parse::<MovementStatus>())
        .transpose()?;

    let details = state.movement_service().list_details(status).await?;
    let base_url = state.config.public_base_url.clone();
    let items = details
        .into_iter()
        .map(|detail| MovementDetailResponse::build(detail, &base_url))
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/movements/{id}",
    params(("id" = i32, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement detail fetched", body = ApiResponse<MovementDetailResponse>),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<MovementDetailResponse> {
    let detail = state.movement_service().get_detail(id).await?;
    Ok(Json(ApiResponse::success(MovementDetailResponse::build(
        detail,
        &state.config.public_base_url,
    ))))
}

#[utoipa::path(
    put,
    path = "/movements/{id}/start",
    params(("id" = i32, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Delivery started", body = ApiResponse<EvidenceUploadResponse>),
        (status = 400, description = "Missing evidence or driver name, or illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn start_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<EvidenceUploadResponse> {
    let evidence = read_evidence(multipart).await?;
    let reference = state
        .evidence_store
        .store(&evidence.file_name, &evidence.bytes)
        .await?;

    // A rejected transition must not leave the uploaded file behind.
    if let Err(err) = state
        .movement_service()
        .start_delivery(id, reference.clone(), &evidence.driver_name)
        .await
    {
        state.evidence_store.discard(&reference).await;
        return Err(err);
    }

    Ok(Json(ApiResponse::success(EvidenceUploadResponse {
        message: "Movement updated to \"in_transit\". History updated.".to_string(),
        file_path: reference,
    })))
}

#[utoipa::path(
    put,
    path = "/movements/{id}/end",
    params(("id" = i32, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Delivery finalized", body = ApiResponse<EvidenceUploadResponse>),
        (status = 400, description = "Missing evidence or driver name, or illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn finalize_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<EvidenceUploadResponse> {
    let evidence = read_evidence(multipart).await?;
    let reference = state
        .evidence_store
        .store(&evidence.file_name, &evidence.bytes)
        .await?;

    if let Err(err) = state
        .movement_service()
        .finalize_delivery(id, reference.clone(), &evidence.driver_name)
        .await
    {
        state.evidence_store.discard(&reference).await;
        return Err(err);
    }

    Ok(Json(ApiResponse::success(EvidenceUploadResponse {
        message: "Movement updated to \"finalized\". History updated.".to_string(),
        file_path: reference,
    })))
}

#[utoipa::path(
    post,
    path = "/movements/{id}/cancel",
    params(("id" = i32, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement cancelled", body = ApiResponse<MovementSummary>),
        (status = 400, description = "Movement is not cancellable", body = crate::errors::ErrorResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn cancel_movement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<MovementSummary> {
    let updated = state.movement_service().cancel_movement(id).await?;
    Ok(Json(ApiResponse::success(MovementSummary::from(updated))))
}

#[utoipa::path(
    patch,
    path = "/movements/{id}/status",
    params(("id" = i32, Path, description = "Movement ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status overwritten", body = ApiResponse<MovementSummary>),
        (status = 400, description = "Unknown status label", body = crate::errors::ErrorResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdateRequest>,
) -> ApiResult<MovementSummary> {
    let status = payload.status.parse::<MovementStatus>()?;
    let updated = state.movement_service().set_status(id, status).await?;
    Ok(Json(ApiResponse::success(MovementSummary::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/movements/{id}",
    params(("id" = i32, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement and history deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    state.movement_service().delete_movement(id).await?;
    Ok(Json(ApiResponse::success(
        json!({ "message": "Movement deleted successfully." }),
    )))
}

struct EvidenceUpload {
    driver_name: String,
    file_name: String,
    bytes: Vec<u8>,
}

/// Pulls the evidence image and driver name out of the multipart body.
/// Both parts are required; `motorista` is accepted as a legacy alias for
/// the driver field.
async fn read_evidence(mut multipart: Multipart) -> Result<EvidenceUpload, ServiceError> {
    let mut driver_name: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("driver_name") | Some("motorista") => {
                let value = field.text().await.map_err(|e| {
                    ServiceError::ValidationError(format!("Unreadable driver name: {}", e))
                })?;
                driver_name = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("evidence").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ServiceError::ValidationError(format!("Unreadable evidence file: {}", e))
                })?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let driver_name = driver_name.filter(|n| !n.trim().is_empty());
    match (driver_name, file) {
        (Some(driver_name), Some((file_name, bytes))) => Ok(EvidenceUpload {
            driver_name,
            file_name,
            bytes,
        }),
        _ => Err(ServiceError::ValidationError(
            "Evidence image or driver name missing".to_string(),
        )),
    }
}
