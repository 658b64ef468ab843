use axum::{extract::State, response::Json};

use crate::handlers::products::BranchOption;
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/branches/options",
    responses(
        (status = 200, description = "All branches for selection lists", body = ApiResponse<Vec<BranchOption>>)
    ),
    tag = "branches"
)]
pub async fn branch_options(State(state): State<AppState>) -> ApiResult<Vec<BranchOption>> {
    let branches = state.product_service().branch_options().await?;
    let options = branches
        .into_iter()
        .map(|b| BranchOption {
            id: b.id,
            name: b.name,
            location: b.location,
            latitude: b.latitude,
            longitude: b.longitude,
        })
        .collect();
    Ok(Json(ApiResponse::success(options)))
}
