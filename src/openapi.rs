use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Branch Movement API",
        version = "1.0.0",
        description = r#"
# Branch Movement API

Backend for tracking stock movements between company branches.

## Features

- **Stock ledger**: per-branch product quantities, debited when a movement is created
- **Movement lifecycle**: created, in_transit, collection_finished, finalized, cancelled
- **Evidence uploads**: drivers attach a photo when starting and finishing a delivery
- **Audit trail**: every lifecycle step is recorded in an append-only history
- **User accounts**: admin, branch, and driver profiles with token-based login
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "movements", description = "Movement lifecycle endpoints"),
        (name = "products", description = "Stocked product endpoints"),
        (name = "branches", description = "Branch endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "auth", description = "Authentication endpoints")
    ),
    paths(
        // Movements
        crate::handlers::movements::create_movement,
        crate::handlers::movements::list_movements,
        crate::handlers::movements::get_movement,
        crate::handlers::movements::start_delivery,
        crate::handlers::movements::finalize_delivery,
        crate::handlers::movements::cancel_movement,
        crate::handlers::movements::update_status,
        crate::handlers::movements::delete_movement,

        // Products and branches
        crate::handlers::products::list_products,
        crate::handlers::products::product_options,
        crate::handlers::products::quantity_at_branch,
        crate::handlers::branches::branch_options,

        // Users
        crate::handlers::users::register_user,
        crate::handlers::users::login,
        crate::handlers::users::list_users,
        crate::handlers::users::toggle_user_status,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,

            crate::entities::movement::MovementStatus,
            crate::handlers::movements::CreateMovementRequest,
            crate::handlers::movements::StatusUpdateRequest,
            crate::handlers::movements::MovementSummary,
            crate::handlers::movements::MovementDetailResponse,
            crate::handlers::movements::HistoryEntryResponse,
            crate::handlers::movements::ProductRef,
            crate::handlers::movements::BranchRef,
            crate::handlers::movements::EvidenceUploadResponse,

            crate::handlers::products::ProductListItem,
            crate::handlers::products::ProductBranch,
            crate::handlers::products::ProductOption,
            crate::handlers::products::BranchOption,
            crate::handlers::products::QuantityResponse,

            crate::entities::user::UserProfile,
            crate::handlers::users::RegisterUserRequest,
            crate::handlers::users::LoginRequest,
            crate::handlers::users::LoginResponse,
            crate::handlers::users::UserResponse,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
