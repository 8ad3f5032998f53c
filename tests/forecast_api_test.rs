mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};
use parlevel_api::entities::{pos_order, reservation};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn noon_utc(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// Seed `days` consecutive history days ending yesterday: each day one
/// completed reservation of `covers` guests and one paid POS sale of
/// `quantity` units of `item`.
async fn seed_steady_history(
    app: &TestApp,
    org_id: Uuid,
    item: &str,
    days: i64,
    covers: i32,
    quantity: i32,
) {
    for i in 1..=days {
        let day = today() - Duration::days(i);
        app.seed_reservation(org_id, day, covers, reservation::status::COMPLETED)
            .await;
        app.seed_pos_sale(org_id, noon_utc(day), pos_order::status::PAID, item, quantity)
            .await;
    }
}

#[tokio::test]
async fn forecast_predicts_from_per_cover_rate() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    // 10 days of history: 20 units over 10 covers per day -> 2.0 per cover
    seed_steady_history(&app, org_id, "roast chicken", 10, 10, 20).await;

    // Target date: 15 confirmed + 10 seated covers
    let target = today() + Duration::days(1);
    app.seed_reservation(org_id, target, 15, reservation::status::CONFIRMED)
        .await;
    app.seed_reservation(org_id, target, 10, reservation::status::SEATED)
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": org_id, "date": target })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["covers"], 25);
    assert_eq!(body["date"], target.to_string());
    assert_eq!(body["day"], target.format("%A").to_string());

    let predictions = body["predictions"].as_array().expect("predictions array");
    assert_eq!(predictions.len(), 1);
    let p = &predictions[0];
    assert_eq!(p["item_name"], "roast chicken");
    assert_eq!(p["predicted_qty"], 50);
    assert_eq!(p["avg_per_cover"], 2.0);
    // 10 consecutive days: no weekday reaches 3 occurrences
    assert_eq!(p["dow_weight"], 1.0);
    assert_eq!(p["confidence"], "low");
    assert_eq!(p["data_points"], 10);
}

#[tokio::test]
async fn forecast_without_covers_returns_empty_with_message() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    seed_steady_history(&app, org_id, "soup", 5, 10, 10).await;

    // No reservations on the target date
    let target = today() + Duration::days(1);
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": org_id, "date": target })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["covers"], 0);
    assert_eq!(body["message"], "No covers for this date");
    assert!(body["predictions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn forecast_honors_explicit_cover_count() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    seed_steady_history(&app, org_id, "roast chicken", 10, 10, 20).await;

    // No reservations tomorrow, but the caller supplies the covers directly
    let target = today() + Duration::days(1);
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": org_id, "date": target, "cover_count": 100 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["covers"], 100);
    assert_eq!(body["predictions"][0]["predicted_qty"], 200);
}

#[tokio::test]
async fn imported_covers_override_reservation_covers() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    // One history day: reservations say 10 covers, but the imported row
    // carries an explicit figure of 40 which takes precedence
    let day = today() - Duration::days(3);
    app.seed_reservation(org_id, day, 10, reservation::status::COMPLETED)
        .await;
    app.seed_sales_import(org_id, day, "pasta", 20, Some(40)).await;

    let target = today() + Duration::days(1);
    app.seed_reservation(org_id, target, 10, reservation::status::CONFIRMED)
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": org_id, "date": target })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // avg_per_cover = 20 / 40 = 0.5, not 20 / 10
    let body = response_json(response).await;
    assert_eq!(body["predictions"][0]["avg_per_cover"], 0.5);
    assert_eq!(body["predictions"][0]["predicted_qty"], 5);
}

#[tokio::test]
async fn voided_orders_and_cancelled_reservations_are_ignored() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    let day = today() - Duration::days(2);
    app.seed_reservation(org_id, day, 10, reservation::status::COMPLETED)
        .await;
    app.seed_pos_sale(org_id, noon_utc(day), pos_order::status::PAID, "steak", 5)
        .await;
    // Voided sale of the same item must not count as evidence
    app.seed_pos_sale(org_id, noon_utc(day), pos_order::status::VOIDED, "steak", 500)
        .await;

    let target = today() + Duration::days(1);
    app.seed_reservation(org_id, target, 10, reservation::status::CONFIRMED)
        .await;
    // Cancelled reservations must not add to target covers
    app.seed_reservation(org_id, target, 50, reservation::status::CANCELLED)
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": org_id, "date": target })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["covers"], 10);
    // 5 units over 10 covers, scaled to 10 covers
    assert_eq!(body["predictions"][0]["predicted_qty"], 5);
}

#[tokio::test]
async fn forecast_requires_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "org_id": Uuid::new_v4() })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forecast_rejects_missing_org_id() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/forecast/dish-par",
            Some(json!({ "date": today() })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rerun_overwrites_cached_predictions() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    seed_steady_history(&app, org_id, "roast chicken", 10, 10, 20).await;
    let target = today() + Duration::days(1);
    app.seed_reservation(org_id, target, 25, reservation::status::CONFIRMED)
        .await;

    let body = json!({ "org_id": org_id, "date": target });
    for _ in 0..2 {
        let response = app
            .request_authenticated(Method::POST, "/api/v1/forecast/dish-par", Some(body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Two runs, still one cached row per item
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/predictions?org_id={}", org_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    let cached = body["data"].as_array().expect("cached predictions array");
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0]["item_name"], "roast chicken");
    assert_eq!(cached[0]["avg_qty_per_cover"], 2.0);
    assert_eq!(cached[0]["data_points"], 10);
    let weights = cached[0]["day_of_week_weights"]
        .as_object()
        .expect("weights object");
    assert_eq!(weights.len(), 7);
}

#[tokio::test]
async fn covers_endpoint_sums_confirmed_and_seated_only() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();
    let date = today() + Duration::days(2);

    app.seed_reservation(org_id, date, 4, reservation::status::CONFIRMED)
        .await;
    app.seed_reservation(org_id, date, 2, reservation::status::SEATED)
        .await;
    app.seed_reservation(org_id, date, 6, reservation::status::CANCELLED)
        .await;
    app.seed_reservation(org_id, date, 3, reservation::status::NO_SHOW)
        .await;

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/reservations/covers?org_id={}&date={}", org_id, date),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["covers"], 6);
}

#[tokio::test]
async fn sales_import_endpoint_persists_rows() {
    let app = TestApp::new().await;
    let org_id = Uuid::new_v4();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/sales-imports",
            Some(json!({
                "org_id": org_id,
                "rows": [
                    { "sale_date": today() - Duration::days(4), "item_name": "lamb shank", "quantity_sold": 12, "covers": 40 },
                    { "sale_date": today() - Duration::days(5), "item_name": "lamb shank", "quantity_sold": 9 },
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["rows_imported"], 2);
}

#[tokio::test]
async fn sales_import_rejects_empty_batch() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/sales-imports",
            Some(json!({ "org_id": Uuid::new_v4(), "rows": [] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
