use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use parlevel_api::{
    auth::{consts as perm, AuthConfig, AuthService, User},
    config::AppConfig,
    db,
    entities::{pos_order, pos_order_item, reservation, sales_import},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Helper harness for spinning up an application state backed by a SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    db_file: std::path::PathBuf,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_file = std::env::temp_dir().join(format!("parlevel_test_{}.db", Uuid::new_v4()));
        let db_url = format!("sqlite://{}?mode=rwc", db_file.display());

        let mut cfg = AppConfig::new(
            db_url,
            "test_secret_key_for_testing_purposes_only_needs_64_characters_padded".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            Duration::from_secs(cfg.refresh_token_expiration as u64),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            roles: vec!["admin".to_string()],
            permissions: perm::ALL.iter().map(|p| p.to_string()).collect(),
            org_id: None,
        };
        let token_pair = auth_service
            .generate_token(&user)
            .expect("generate test token");

        let auth_service_for_layer = auth_service.clone();
        let api_router = parlevel_api::api_v1_routes().layer(middleware::from_fn_with_state(
            auth_service_for_layer,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: Request<Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ));

        let router = Router::new()
            .nest("/api/v1", api_router)
            .with_state(state.clone());

        Self {
            router,
            state,
            token: token_pair.access_token,
            db_file,
            _event_task: event_task,
        }
    }

    /// Access the bearer token for the default admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_reservation(
        &self,
        org_id: Uuid,
        date: NaiveDate,
        party_size: i32,
        status: &str,
    ) {
        reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            org_id: Set(org_id),
            reservation_date: Set(date),
            party_size: Set(party_size),
            status: Set(status.to_string()),
            guest_name: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed reservation");
    }

    /// Seed a POS order with one line item, dated by `created_at`.
    pub async fn seed_pos_sale(
        &self,
        org_id: Uuid,
        created_at: DateTime<Utc>,
        status: &str,
        item_name: &str,
        quantity: i32,
    ) {
        let order_id = Uuid::new_v4();
        pos_order::ActiveModel {
            id: Set(order_id),
            org_id: Set(org_id),
            status: Set(status.to_string()),
            total_amount: Set(rust_decimal::Decimal::new(0, 0)),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed pos order");

        pos_order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            item_name: Set(item_name.to_string()),
            quantity: Set(quantity),
            unit_price: Set(rust_decimal::Decimal::new(0, 0)),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed pos order item");
    }

    pub async fn seed_sales_import(
        &self,
        org_id: Uuid,
        sale_date: NaiveDate,
        item_name: &str,
        quantity_sold: i32,
        covers: Option<i32>,
    ) {
        sales_import::ActiveModel {
            id: Set(Uuid::new_v4()),
            org_id: Set(org_id),
            sale_date: Set(sale_date),
            item_name: Set(item_name.to_string()),
            quantity_sold: Set(quantity_sold),
            covers: Set(covers),
            source: Set(Some("test-fixture".to_string())),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed sales import");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_file);
    }
}

/// Read and deserialize a JSON response body.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid json")
}
