//! Bulk ingestion of historical sales rows.
//!
//! Imported rows are appended as-is. Nothing checks whether an imported date
//! range overlaps live POS history; overlapping evidence double-counts at
//! forecast time and that trade-off belongs to the importer.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::sales_import;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// One row of a sales import payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SalesImportRow {
    pub sale_date: NaiveDate,
    #[validate(length(min = 1, max = 255))]
    pub item_name: String,
    #[validate(range(min = 1))]
    pub quantity_sold: i32,
    /// Covers served that day, when the source system recorded them.
    /// Overrides reservation-derived covers for the date at forecast time.
    #[validate(range(min = 1))]
    pub covers: Option<i32>,
    #[validate(length(max = 64))]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSalesImportRequest {
    pub org_id: Uuid,
    #[validate(length(min = 1))]
    #[validate]
    pub rows: Vec<SalesImportRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesImportResult {
    pub org_id: Uuid,
    pub rows_imported: usize,
}

#[derive(Clone)]
pub struct SalesImportService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SalesImportService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Validate and append a batch of historical sales rows.
    pub async fn import(
        &self,
        request: CreateSalesImportRequest,
    ) -> Result<SalesImportResult, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let now = Utc::now();
        let org_id = request.org_id;
        let count = request.rows.len();

        let models: Vec<sales_import::ActiveModel> = request
            .rows
            .into_iter()
            .map(|row| sales_import::ActiveModel {
                id: Set(Uuid::new_v4()),
                org_id: Set(org_id),
                sale_date: Set(row.sale_date),
                item_name: Set(row.item_name),
                quantity_sold: Set(row.quantity_sold),
                covers: Set(row.covers),
                source: Set(row.source),
                created_at: Set(now),
            })
            .collect();

        sales_import::Entity::insert_many(models)
            .exec(&*self.db)
            .await?;

        info!(%org_id, rows = count, "sales import stored");
        if let Err(e) = self
            .event_sender
            .send(Event::SalesImported { org_id, rows: count })
            .await
        {
            error!("Failed to emit sales import event: {}", e);
        }

        Ok(SalesImportResult {
            org_id,
            rows_imported: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> SalesImportRow {
        SalesImportRow {
            sale_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            item_name: "lamb shank".to_string(),
            quantity_sold: 12,
            covers: Some(40),
            source: Some("legacy-pos".to_string()),
        }
    }

    #[test]
    fn empty_batch_fails_validation() {
        let request = CreateSalesImportRequest {
            org_id: Uuid::new_v4(),
            rows: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn non_positive_quantity_fails_validation() {
        let mut row = valid_row();
        row.quantity_sold = 0;
        let request = CreateSalesImportRequest {
            org_id: Uuid::new_v4(),
            rows: vec![row],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn covers_are_optional_but_must_be_positive_when_given() {
        let mut row = valid_row();
        row.covers = None;
        assert!(row.validate().is_ok());

        row.covers = Some(0);
        assert!(row.validate().is_err());
    }
}
