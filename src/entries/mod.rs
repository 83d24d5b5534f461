use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::FoodItem;
use crate::error::RepositoryError;

/// One logged food item, built from an analysis result or manual entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,

    /// The verbatim spoken/typed description this entry came from
    pub raw_description: String,

    pub food_name: String,
    pub quantity: f64,
    pub unit: String,

    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,

    /// Model confidence, 0.0 to 1.0
    pub confidence: f64,
    pub matched_ingredient_id: Option<String>,
}

impl FoodEntry {
    /// Build an entry from one analyzed food item
    pub fn from_food_item(
        raw_description: &str,
        item: &FoodItem,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            raw_description: raw_description.to_string(),
            food_name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            calories: item.calories,
            protein: item.protein,
            carbohydrates: item.carbohydrates,
            fat: item.fat,
            confidence: item.confidence,
            matched_ingredient_id: item.matched_ingredient_id.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.quantity > 0.0
            && !self.food_name.is_empty()
            && self.calories >= 0.0
            && self.protein >= 0.0
            && self.carbohydrates >= 0.0
            && self.fat >= 0.0
    }
}

/// Per-day nutrition rollup over the entries logged on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub day: NaiveDate,

    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,

    pub entry_count: usize,

    /// Mean model confidence across the day's entries; 0.0 for an empty day
    pub average_confidence: f64,
}

impl DailyTotal {
    /// Aggregate a day's entries. Entries from other days are the caller's
    /// bug; values are summed as given.
    pub fn from_entries(day: NaiveDate, entries: &[FoodEntry]) -> Self {
        let entry_count = entries.len();
        let average_confidence = if entry_count == 0 {
            0.0
        } else {
            entries.iter().map(|e| e.confidence).sum::<f64>() / entry_count as f64
        };

        Self {
            day,
            calories: entries.iter().map(|e| e.calories).sum(),
            protein: entries.iter().map(|e| e.protein).sum(),
            carbohydrates: entries.iter().map(|e| e.carbohydrates).sum(),
            fat: entries.iter().map(|e| e.fat).sum(),
            entry_count,
            average_confidence,
        }
    }

    pub fn has_entries(&self) -> bool {
        self.entry_count > 0
    }
}

/// Food entry repository collaborator: CRUD plus day and range queries
#[async_trait]
pub trait FoodEntryRepository: Send + Sync {
    async fn create(&self, entry: FoodEntry) -> Result<FoodEntry, RepositoryError>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<FoodEntry>, RepositoryError>;

    async fn fetch_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, RepositoryError>;

    async fn fetch_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FoodEntry>, RepositoryError>;

    async fn update(&self, entry: FoodEntry) -> Result<(), RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn delete_for_day(&self, day: NaiveDate) -> Result<usize, RepositoryError>;

    /// Aggregate one day's entries into a [`DailyTotal`]
    async fn totals_for_day(&self, day: NaiveDate) -> Result<DailyTotal, RepositoryError> {
        let entries = self.fetch_for_day(day).await?;
        Ok(DailyTotal::from_entries(day, &entries))
    }
}

/// In-memory repository used by tests and the demo binary
#[derive(Default)]
pub struct InMemoryFoodEntryRepository {
    entries: RwLock<Vec<FoodEntry>>,
}

impl InMemoryFoodEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FoodEntryRepository for InMemoryFoodEntryRepository {
    async fn create(&self, entry: FoodEntry) -> Result<FoodEntry, RepositoryError> {
        if !entry.is_valid() {
            return Err(RepositoryError::Validation(
                "invalid food entry data".to_string(),
            ));
        }

        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<FoodEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn fetch_for_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.timestamp.date_naive() == day)
            .cloned()
            .collect())
    }

    async fn fetch_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FoodEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .cloned()
            .collect())
    }

    async fn update(&self, entry: FoodEntry) -> Result<(), RepositoryError> {
        if !entry.is_valid() {
            return Err(RepositoryError::Validation(
                "invalid food entry data".to_string(),
            ));
        }

        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(RepositoryError::QueryFailed(format!(
                "no entry with id {}",
                entry.id
            ))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.entries.write().await.retain(|e| e.id != id);
        Ok(())
    }

    async fn delete_for_day(&self, day: NaiveDate) -> Result<usize, RepositoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.timestamp.date_naive() != day);
        Ok(before - entries.len())
    }
}
