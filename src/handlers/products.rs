use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{branch, product};
use crate::{ApiResult, ApiResponse, AppState};

#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Case-insensitive substring match against product or branch name
    pub query: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListItem {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub branch: ProductBranch,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductBranch {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductOption {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchOption {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityResponse {
    pub product_id: i32,
    pub branch_id: i32,
    pub quantity: i32,
}

fn list_item(product: product::Model, branch: branch::Model) -> ProductListItem {
    ProductListItem {
        id: product.id,
        name: product.name,
        quantity: product.quantity,
        image_url: product.image_url,
        description: product.description,
        branch: ProductBranch {
            id: branch.id,
            name: branch.name,
            location: branch.location,
            latitude: branch.latitude,
            longitude: branch.longitude,
        },
    }
}

#[utoipa::path(
    get,
    path = "/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Stocked products with their branch", body = ApiResponse<Vec<ProductListItem>>)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<ProductListItem>> {
    let rows = state.product_service().list_products(query.query).await?;
    let items = rows
        .into_iter()
        .map(|(product, branch)| list_item(product, branch))
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/products/options",
    responses(
        (status = 200, description = "Distinct product names for pickers", body = ApiResponse<Vec<ProductOption>>)
    ),
    tag = "products"
)]
pub async fn product_options(State(state): State<AppState>) -> ApiResult<Vec<ProductOption>> {
    let rows = state.product_service().product_options().await?;
    let options = rows
        .into_iter()
        .map(|(id, name)| ProductOption { id, name })
        .collect();
    Ok(Json(ApiResponse::success(options)))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/branches/{branch_id}/quantity",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("branch_id" = i32, Path, description = "Branch ID")
    ),
    responses(
        (status = 200, description = "On-hand quantity at the branch", body = ApiResponse<QuantityResponse>),
        (status = 404, description = "Product is not stocked at the branch", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn quantity_at_branch(
    State(state): State<AppState>,
    Path((product_id, branch_id)): Path<(i32, i32)>,
) -> ApiResult<QuantityResponse> {
    let quantity = state
        .product_service()
        .quantity_at(product_id, branch_id)
        .await?;
    Ok(Json(ApiResponse::success(QuantityResponse {
        product_id,
        branch_id,
        quantity,
    })))
}
