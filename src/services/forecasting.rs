//! Demand-weighted dish par forecasting.
//!
//! Sales evidence is drawn from two sources over a 365-day trailing window:
//! completed/paid POS order line items and manually imported historical-sales
//! rows. The two are merged as equivalent evidence with no deduplication key,
//! so an imported CSV overlapping live POS history double-counts those sales;
//! reconciliation is a product decision and is intentionally not guessed at
//! here.
//!
//! The per-item arithmetic lives in pure functions so the weighting and
//! confidence rules are testable without a database. The service method does
//! one read phase, one fold phase, and one write phase per request; nothing
//! is cached in-process between requests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    dish_prediction, pos_order, pos_order_item, reservation, sales_import,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Trailing history window, in days. Fixed, not caller-configurable.
pub const HISTORY_WINDOW_DAYS: i64 = 365;

/// Minimum historical occurrences on a weekday before that weekday gets its
/// own adjustment factor. Below this the weight stays 1.0 so a couple of
/// outlier services cannot skew a single day's prediction.
pub const DOW_MIN_OCCURRENCES: u32 = 3;

/// Confidence tier thresholds on total observed occurrences.
pub const CONFIDENCE_HIGH_MIN: u32 = 90;
pub const CONFIDENCE_MEDIUM_MIN: u32 = 30;

/// One unit of sales evidence: a quantity of an item sold on a date.
#[derive(Debug, Clone)]
pub struct SalesObservation {
    pub date: NaiveDate,
    pub item_name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DowBucket {
    qty: f64,
    count: u32,
}

/// Per-item accumulator built by folding observations joined with each
/// date's cover count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemStats {
    total_qty: f64,
    total_covers: f64,
    dow: [DowBucket; 7],
}

impl ItemStats {
    /// Total observation count across all weekday buckets.
    pub fn occurrences(&self) -> u32 {
        self.dow.iter().map(|b| b.count).sum()
    }

    pub fn total_qty(&self) -> f64 {
        self.total_qty
    }

    pub fn total_covers(&self) -> f64 {
        self.total_covers
    }
}

/// A single item's forecast as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DishParPrediction {
    pub item_name: String,
    pub predicted_qty: i64,
    pub avg_per_cover: f64,
    pub dow_weight: f64,
    pub confidence: String,
    pub data_points: u32,
}

/// Result of a forecast run. `covers == 0` means the run short-circuited
/// before any aggregation because no covers resolved for the target date.
#[derive(Debug, Clone)]
pub struct DishParForecast {
    pub predictions: Vec<DishParPrediction>,
    pub covers: i64,
    pub date: NaiveDate,
    pub day: String,
}

/// Fold observations into per-item statistics.
///
/// Observations whose date has no positive cover count are skipped entirely:
/// a zero-cover day is missing data (closed, or covers unrecorded), not
/// zero-consumption data, and folding it in would corrupt the per-cover rate.
pub fn aggregate_observations(
    observations: &[SalesObservation],
    covers_by_date: &HashMap<NaiveDate, i64>,
) -> HashMap<String, ItemStats> {
    let mut stats: HashMap<String, ItemStats> = HashMap::new();

    for obs in observations {
        let covers = match covers_by_date.get(&obs.date) {
            Some(&c) if c > 0 => c,
            _ => continue,
        };

        let entry = stats.entry(obs.item_name.clone()).or_default();
        entry.total_qty += obs.quantity;
        entry.total_covers += covers as f64;

        let bucket = &mut entry.dow[obs.date.weekday().num_days_from_monday() as usize];
        bucket.qty += obs.quantity;
        bucket.count += 1;
    }

    stats
}

/// Confidence tier for a given total occurrence count.
pub fn confidence_tier(occurrences: u32) -> &'static str {
    if occurrences >= CONFIDENCE_HIGH_MIN {
        dish_prediction::confidence::HIGH
    } else if occurrences >= CONFIDENCE_MEDIUM_MIN {
        dish_prediction::confidence::MEDIUM
    } else {
        dish_prediction::confidence::LOW
    }
}

/// Weekday adjustment factor for one item on one weekday.
///
/// Only applies when the weekday has at least [`DOW_MIN_OCCURRENCES`]
/// observations; otherwise 1.0 (no adjustment).
pub fn dow_weight(stats: &ItemStats, weekday: Weekday) -> f64 {
    let occurrences = stats.occurrences();
    if occurrences == 0 {
        return 1.0;
    }
    let overall_mean = stats.total_qty / occurrences as f64;
    if overall_mean <= 0.0 {
        return 1.0;
    }

    let bucket = &stats.dow[weekday.num_days_from_monday() as usize];
    if bucket.count < DOW_MIN_OCCURRENCES {
        return 1.0;
    }

    (bucket.qty / bucket.count as f64) / overall_mean
}

/// Weight map for every weekday, keyed "0" (Monday) through "6" (Sunday).
/// This is what gets cached alongside the per-cover rate.
pub fn dow_weight_map(stats: &ItemStats) -> HashMap<String, f64> {
    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    weekdays
        .iter()
        .map(|wd| {
            (
                wd.num_days_from_monday().to_string(),
                dow_weight(stats, *wd),
            )
        })
        .collect()
}

/// Compute one item's prediction for a target day.
///
/// Returns `None` when no per-cover rate can be formed (zero historical
/// covers) or when the rounded prediction is not positive.
pub fn predict_item(
    item_name: &str,
    stats: &ItemStats,
    target_covers: i64,
    target_weekday: Weekday,
) -> Option<DishParPrediction> {
    if stats.total_covers <= 0.0 {
        return None;
    }

    let avg_per_cover = stats.total_qty / stats.total_covers;
    let weight = dow_weight(stats, target_weekday);

    let predicted = (avg_per_cover * target_covers as f64 * weight).round() as i64;
    if predicted <= 0 {
        return None;
    }

    let occurrences = stats.occurrences();
    Some(DishParPrediction {
        item_name: item_name.to_string(),
        predicted_qty: predicted,
        avg_per_cover,
        dow_weight: weight,
        confidence: confidence_tier(occurrences).to_string(),
        data_points: occurrences,
    })
}

/// Sort predictions strictly descending by predicted quantity, breaking ties
/// by item name so repeated runs serialize identically.
pub fn rank_predictions(mut predictions: Vec<DishParPrediction>) -> Vec<DishParPrediction> {
    predictions.sort_by(|a, b| {
        b.predicted_qty
            .cmp(&a.predicted_qty)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    predictions
}

/// Forecasting service: covers resolution, evidence gathering, the fold, and
/// the prediction-cache upsert.
#[derive(Clone)]
pub struct ForecastingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ForecastingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Run the dish par forecast for one organization and target date.
    ///
    /// The computation is all-or-nothing: any store read failure aborts the
    /// whole request with no partial result and no retry.
    pub async fn forecast_dish_par(
        &self,
        org_id: Uuid,
        target_date: NaiveDate,
        cover_override: Option<i64>,
    ) -> Result<DishParForecast, ServiceError> {
        let day = target_date.format("%A").to_string();

        // Step 1: resolve target covers
        let target_covers = match cover_override {
            Some(c) => c,
            None => self.resolve_target_covers(org_id, target_date).await?,
        };

        if target_covers <= 0 {
            info!(%org_id, %target_date, "no covers resolved for target date; skipping forecast");
            self.emit(Event::DishParSkipped {
                org_id,
                target_date,
            })
            .await;
            return Ok(DishParForecast {
                predictions: Vec::new(),
                covers: 0,
                date: target_date,
                day,
            });
        }

        // Steps 2 and 3: gather the historical window
        let now = Utc::now();
        let window_start = now - Duration::days(HISTORY_WINDOW_DAYS);
        let window_start_date = window_start.date_naive();

        let observations = self.gather_observations(org_id, window_start).await?;
        let covers_by_date = self
            .resolve_historical_covers(org_id, window_start_date)
            .await?;

        // Step 4: fold
        let stats = aggregate_observations(&observations, &covers_by_date);

        // Step 5: predict per item
        let target_weekday = target_date.weekday();
        let mut predictions = Vec::new();
        for (item_name, item_stats) in &stats {
            if let Some(prediction) =
                predict_item(item_name, item_stats, target_covers, target_weekday)
            {
                predictions.push(prediction);
            }
        }
        let predictions = rank_predictions(predictions);

        // Step 6: overwrite the prediction cache for every item with a rate
        self.persist_predictions(org_id, &stats, now).await?;

        info!(
            %org_id,
            %target_date,
            covers = target_covers,
            observations = observations.len(),
            items = stats.len(),
            predicted = predictions.len(),
            "dish par forecast complete"
        );
        self.emit(Event::DishParTrained {
            org_id,
            target_date,
            items_predicted: predictions.len(),
            covers: target_covers,
        })
        .await;

        Ok(DishParForecast {
            predictions,
            covers: target_covers,
            date: target_date,
            day,
        })
    }

    /// Sum party sizes of confirmed and seated reservations on the target date.
    pub async fn resolve_target_covers(
        &self,
        org_id: Uuid,
        date: NaiveDate,
    ) -> Result<i64, ServiceError> {
        let reservations = reservation::Entity::find()
            .filter(reservation::Column::OrgId.eq(org_id))
            .filter(reservation::Column::ReservationDate.eq(date))
            .filter(
                reservation::Column::Status
                    .is_in([reservation::status::CONFIRMED, reservation::status::SEATED]),
            )
            .all(&*self.db)
            .await?;

        Ok(reservations.iter().map(|r| r.party_size as i64).sum())
    }

    /// Collect sales evidence from both sources over the trailing window.
    async fn gather_observations(
        &self,
        org_id: Uuid,
        window_start: chrono::DateTime<Utc>,
    ) -> Result<Vec<SalesObservation>, ServiceError> {
        let mut observations = Vec::new();

        // POS line items, dated by their order's creation date
        let orders = pos_order::Entity::find()
            .filter(pos_order::Column::OrgId.eq(org_id))
            .filter(
                pos_order::Column::Status
                    .is_in([pos_order::status::COMPLETED, pos_order::status::PAID]),
            )
            .filter(pos_order::Column::CreatedAt.gte(window_start))
            .all(&*self.db)
            .await?;

        if !orders.is_empty() {
            let order_dates: HashMap<Uuid, NaiveDate> = orders
                .iter()
                .map(|o| (o.id, o.created_at.date_naive()))
                .collect();

            let items = pos_order_item::Entity::find()
                .filter(
                    pos_order_item::Column::OrderId
                        .is_in(order_dates.keys().copied().collect::<Vec<_>>()),
                )
                .all(&*self.db)
                .await?;

            for item in items {
                if let Some(&date) = order_dates.get(&item.order_id) {
                    observations.push(SalesObservation {
                        date,
                        item_name: item.item_name,
                        quantity: item.quantity as f64,
                    });
                }
            }
        }

        // Imported historical-sales rows, dated by their recorded sale date.
        // Merged as-is: both sources are equivalent evidence, not reconciled.
        let imports = sales_import::Entity::find()
            .filter(sales_import::Column::OrgId.eq(org_id))
            .filter(sales_import::Column::SaleDate.gte(window_start.date_naive()))
            .all(&*self.db)
            .await?;

        for row in imports {
            observations.push(SalesObservation {
                date: row.sale_date,
                item_name: row.item_name,
                quantity: row.quantity_sold as f64,
            });
        }

        Ok(observations)
    }

    /// Build the date -> covers map for the historical window.
    ///
    /// Reservation-derived figures come from confirmed, seated, and completed
    /// reservations; an imported row's explicit covers figure takes precedence
    /// for its date when present and positive.
    async fn resolve_historical_covers(
        &self,
        org_id: Uuid,
        window_start_date: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, ServiceError> {
        let reservations = reservation::Entity::find()
            .filter(reservation::Column::OrgId.eq(org_id))
            .filter(reservation::Column::ReservationDate.gte(window_start_date))
            .filter(reservation::Column::Status.is_in([
                reservation::status::CONFIRMED,
                reservation::status::SEATED,
                reservation::status::COMPLETED,
            ]))
            .all(&*self.db)
            .await?;

        let mut covers_by_date: HashMap<NaiveDate, i64> = HashMap::new();
        for r in reservations {
            *covers_by_date.entry(r.reservation_date).or_insert(0) += r.party_size as i64;
        }

        let imports = sales_import::Entity::find()
            .filter(sales_import::Column::OrgId.eq(org_id))
            .filter(sales_import::Column::SaleDate.gte(window_start_date))
            .all(&*self.db)
            .await?;

        for row in imports {
            if let Some(covers) = row.covers {
                if covers > 0 {
                    covers_by_date.insert(row.sale_date, covers as i64);
                }
            }
        }

        Ok(covers_by_date)
    }

    /// Upsert one cache row per item that produced a per-cover rate.
    /// Last writer wins; concurrent runs converge on the same recomputed
    /// values, so overwrite semantics need no locking.
    async fn persist_predictions(
        &self,
        org_id: Uuid,
        stats: &HashMap<String, ItemStats>,
        trained_at: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        for (item_name, item_stats) in stats {
            if item_stats.total_covers <= 0.0 {
                continue;
            }

            let weights = serde_json::to_value(dow_weight_map(item_stats))
                .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

            let model = dish_prediction::ActiveModel {
                id: Set(Uuid::new_v4()),
                org_id: Set(org_id),
                item_name: Set(item_name.clone()),
                avg_qty_per_cover: Set(item_stats.total_qty / item_stats.total_covers),
                total_historical_qty: Set(item_stats.total_qty.round() as i64),
                total_historical_covers: Set(item_stats.total_covers.round() as i64),
                confidence: Set(confidence_tier(item_stats.occurrences()).to_string()),
                day_of_week_weights: Set(weights),
                data_points: Set(item_stats.occurrences() as i32),
                last_trained_at: Set(trained_at),
            };

            dish_prediction::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        dish_prediction::Column::OrgId,
                        dish_prediction::Column::ItemName,
                    ])
                    .update_columns([
                        dish_prediction::Column::AvgQtyPerCover,
                        dish_prediction::Column::TotalHistoricalQty,
                        dish_prediction::Column::TotalHistoricalCovers,
                        dish_prediction::Column::Confidence,
                        dish_prediction::Column::DayOfWeekWeights,
                        dish_prediction::Column::DataPoints,
                        dish_prediction::Column::LastTrainedAt,
                    ])
                    .to_owned(),
                )
                .exec(&*self.db)
                .await?;
        }

        Ok(())
    }

    /// List the cached predictions for an organization, most recently
    /// trained first.
    pub async fn list_cached_predictions(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<dish_prediction::Model>, ServiceError> {
        use sea_orm::QueryOrder;

        let rows = dish_prediction::Entity::find()
            .filter(dish_prediction::Column::OrgId.eq(org_id))
            .order_by_desc(dish_prediction::Column::LastTrainedAt)
            .order_by_asc(dish_prediction::Column::ItemName)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            error!("Failed to emit forecasting event: {}", e);
        }
    }
}
