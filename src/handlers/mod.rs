use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

pub mod forecast;
pub mod reservations;
pub mod sales_imports;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub forecasting: Arc<crate::services::forecasting::ForecastingService>,
    pub sales_imports: Arc<crate::services::sales_imports::SalesImportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let forecasting = Arc::new(crate::services::forecasting::ForecastingService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let sales_imports = Arc::new(crate::services::sales_imports::SalesImportService::new(
            db_pool,
            event_sender,
        ));

        Self {
            forecasting,
            sales_imports,
        }
    }
}
