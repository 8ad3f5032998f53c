use axum::{extract::State, http::StatusCode, response::Json};

use crate::errors::ServiceError;
use crate::services::sales_imports::{CreateSalesImportRequest, SalesImportResult};
use crate::{ApiResponse, AppState};

/// Bulk-insert historical sales rows for an organization.
#[utoipa::path(
    post,
    path = "/api/v1/sales-imports",
    summary = "Import historical sales",
    description = "Append a batch of historical sales rows used as forecast evidence",
    request_body = CreateSalesImportRequest,
    responses(
        (status = 201, description = "Rows imported", body = ApiResponse<SalesImportResult>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_sales_import(
    State(state): State<AppState>,
    Json(request): Json<CreateSalesImportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SalesImportResult>>), ServiceError> {
    let result = state.services.sales_imports.import(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}
