use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::dish_prediction;
use crate::errors::ServiceError;
use crate::services::forecasting::DishParPrediction;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct DishParRequest {
    /// Organization to forecast for. Required; rejected with 400 if absent.
    pub org_id: Option<Uuid>,
    /// Target service date. Defaults to today (UTC) when omitted.
    pub date: Option<NaiveDate>,
    /// Explicit cover count. When present it replaces the
    /// reservation-derived figure for the target date.
    pub cover_count: Option<i64>,
}

/// Forecast response when covers resolved for the target date.
#[derive(Debug, Serialize, ToSchema)]
pub struct DishParResponse {
    pub predictions: Vec<DishParPrediction>,
    pub covers: i64,
    pub date: NaiveDate,
    pub day: String,
}

/// Forecast response when no covers resolved; no predictions are computed.
#[derive(Debug, Serialize, ToSchema)]
pub struct NoCoversResponse {
    pub predictions: Vec<DishParPrediction>,
    pub covers: i64,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ForecastOutcome {
    Forecast(DishParResponse),
    NoCovers(NoCoversResponse),
}

/// Run the demand-weighted dish par forecast.
#[utoipa::path(
    post,
    path = "/api/v1/forecast/dish-par",
    summary = "Forecast dish pars",
    description = "Predict per-item prep quantities for a service date from weighted sales history",
    request_body = DishParRequest,
    responses(
        (status = 200, description = "Forecast computed", body = DishParResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn forecast_dish_par(
    State(state): State<AppState>,
    Json(request): Json<DishParRequest>,
) -> Result<Json<ForecastOutcome>, ServiceError> {
    let org_id = request
        .org_id
        .ok_or_else(|| ServiceError::InvalidInput("org_id is required".to_string()))?;

    if let Some(covers) = request.cover_count {
        if covers < 0 {
            return Err(ServiceError::InvalidInput(
                "cover_count must not be negative".to_string(),
            ));
        }
    }

    let target_date = request.date.unwrap_or_else(|| Utc::now().date_naive());

    let forecast = state
        .services
        .forecasting
        .forecast_dish_par(org_id, target_date, request.cover_count)
        .await?;

    if forecast.covers == 0 {
        return Ok(Json(ForecastOutcome::NoCovers(NoCoversResponse {
            predictions: Vec::new(),
            covers: 0,
            message: "No covers for this date".to_string(),
        })));
    }

    Ok(Json(ForecastOutcome::Forecast(DishParResponse {
        predictions: forecast.predictions,
        covers: forecast.covers,
        date: forecast.date,
        day: forecast.day,
    })))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictionsQuery {
    pub org_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CachedPredictionResponse {
    pub item_name: String,
    pub avg_qty_per_cover: f64,
    pub confidence: String,
    pub day_of_week_weights: serde_json::Value,
    pub data_points: i32,
    pub last_trained_at: chrono::DateTime<Utc>,
}

impl From<dish_prediction::Model> for CachedPredictionResponse {
    fn from(model: dish_prediction::Model) -> Self {
        Self {
            item_name: model.item_name,
            avg_qty_per_cover: model.avg_qty_per_cover,
            confidence: model.confidence,
            day_of_week_weights: model.day_of_week_weights,
            data_points: model.data_points,
            last_trained_at: model.last_trained_at,
        }
    }
}

/// List the cached per-item model parameters for an organization.
#[utoipa::path(
    get,
    path = "/api/v1/predictions",
    summary = "List cached predictions",
    description = "Read the per-item model parameters stored by the most recent forecast runs",
    params(("org_id" = Uuid, Query, description = "Organization ID")),
    responses(
        (status = 200, description = "Cached predictions retrieved", body = ApiResponse<Vec<CachedPredictionResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionsQuery>,
) -> Result<Json<ApiResponse<Vec<CachedPredictionResponse>>>, ServiceError> {
    let rows = state
        .services
        .forecasting
        .list_cached_predictions(query.org_id)
        .await?;

    let responses: Vec<CachedPredictionResponse> =
        rows.into_iter().map(CachedPredictionResponse::from).collect();
    Ok(Json(ApiResponse::success(responses)))
}
