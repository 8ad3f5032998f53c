use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CoversQuery {
    pub org_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoversResponse {
    pub org_id: Uuid,
    pub date: NaiveDate,
    pub covers: i64,
}

/// Resolve the expected cover count for a date from its reservations,
/// exactly as the forecaster would.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/covers",
    summary = "Resolve covers for a date",
    description = "Sum party sizes of confirmed and seated reservations on a date",
    params(
        ("org_id" = Uuid, Query, description = "Organization ID"),
        ("date" = String, Query, description = "Service date (YYYY-MM-DD)"),
    ),
    responses(
        (status = 200, description = "Cover count resolved", body = ApiResponse<CoversResponse>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_covers(
    State(state): State<AppState>,
    Query(query): Query<CoversQuery>,
) -> Result<Json<ApiResponse<CoversResponse>>, ServiceError> {
    let covers = state
        .services
        .forecasting
        .resolve_target_covers(query.org_id, query.date)
        .await?;

    Ok(Json(ApiResponse::success(CoversResponse {
        org_id: query.org_id,
        date: query.date,
        covers,
    })))
}
