use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parlevel API",
        version = "0.3.0",
        description = r#"
# Parlevel Dish Par Forecasting API

Predicts per-item prep quantities ("dish pars") for a restaurant service
date from demand-weighted sales history.

## How it works

Sales evidence over a 365-day trailing window (POS line items and imported
historical sales rows) is joined with reservation-derived cover counts to
form a per-cover consumption rate for each item, adjusted by a day-of-week
factor and scaled to the target date's expected covers.

## Authentication

All forecast endpoints require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```
        "#,
        contact(
            name = "Parlevel Support",
            email = "support@parlevel.app"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Forecast", description = "Dish par forecasting endpoints"),
        (name = "Sales Imports", description = "Historical sales ingestion endpoints"),
        (name = "Reservations", description = "Cover resolution endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::forecast::forecast_dish_par,
        crate::handlers::forecast::list_predictions,
        crate::handlers::sales_imports::create_sales_import,
        crate::handlers::reservations::get_covers,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,

            crate::handlers::forecast::DishParRequest,
            crate::handlers::forecast::DishParResponse,
            crate::handlers::forecast::NoCoversResponse,
            crate::handlers::forecast::CachedPredictionResponse,
            crate::services::forecasting::DishParPrediction,
            crate::services::sales_imports::CreateSalesImportRequest,
            crate::services::sales_imports::SalesImportRow,
            crate::services::sales_imports::SalesImportResult,
            crate::handlers::reservations::CoversQuery,
            crate::handlers::reservations::CoversResponse,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Parlevel"));
        assert!(json.contains("/api/v1/forecast/dish-par"));
    }
}
