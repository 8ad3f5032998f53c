use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Confidence tiers for a cached prediction, keyed off total observed
/// occurrences: high >= 90, medium >= 30, low otherwise.
pub mod confidence {
    pub const HIGH: &str = "high";
    pub const MEDIUM: &str = "medium";
    pub const LOW: &str = "low";
}

/// Cached "last known prediction" per (org, item). Each training run fully
/// overwrites the previous row; no prediction history is retained.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dish_predictions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub org_id: Uuid,
    pub item_name: String,
    pub avg_qty_per_cover: f64,
    pub total_historical_qty: i64,
    pub total_historical_covers: i64,
    pub confidence: String,
    /// Map of weekday index ("0" = Monday .. "6" = Sunday) to weight
    pub day_of_week_weights: Json,
    pub data_points: i32,
    pub last_trained_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
