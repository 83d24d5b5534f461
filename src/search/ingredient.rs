use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::RepositoryError;

/// A known ingredient with per-100g macros and search metadata.
///
/// The source of truth lives in the external repository; the search index
/// only reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,

    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,

    pub category: String,
    pub usage_count: u64,
    pub search_tokens: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl Ingredient {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            calories_per_100g: 0.0,
            protein_per_100g: 0.0,
            carbs_per_100g: 0.0,
            fat_per_100g: 0.0,
            category: String::new(),
            usage_count: 0,
            search_tokens: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_macros(mut self, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        self.calories_per_100g = calories;
        self.protein_per_100g = protein;
        self.carbs_per_100g = carbs;
        self.fat_per_100g = fat;
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_usage_count(mut self, count: u64) -> Self {
        self.usage_count = count;
        self
    }

    /// One-line description used as analysis prompt context
    pub fn context_line(&self) -> String {
        format!(
            "{} [id={}] ({:.0} kcal, {:.1} g protein, {:.1} g carbs, {:.1} g fat per 100g)",
            self.name,
            self.id,
            self.calories_per_100g,
            self.protein_per_100g,
            self.carbs_per_100g,
            self.fat_per_100g
        )
    }
}

/// Ingredient repository collaborator.
///
/// Bulk fetches are bounded by the caller-supplied limit; ordering of
/// `fetch_all` is the repository's natural order and carries no meaning.
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    async fn fetch_all(&self, limit: usize) -> Result<Vec<Ingredient>, RepositoryError>;

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Ingredient>, RepositoryError>;

    async fn fetch_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<Ingredient>, RepositoryError>;

    /// Fetch sorted by descending usage count
    async fn fetch_by_usage(&self, limit: usize) -> Result<Vec<Ingredient>, RepositoryError>;

    async fn update(&self, ingredient: Ingredient) -> Result<(), RepositoryError>;
}

/// In-memory repository preserving insertion order, used by tests and the
/// demo binary
#[derive(Default)]
pub struct InMemoryIngredientRepository {
    ingredients: RwLock<Vec<Ingredient>>,
}

impl InMemoryIngredientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, ingredients: Vec<Ingredient>) {
        let mut guard = self.ingredients.write().await;
        guard.extend(ingredients);
    }
}

#[async_trait]
impl IngredientRepository for InMemoryIngredientRepository {
    async fn fetch_all(&self, limit: usize) -> Result<Vec<Ingredient>, RepositoryError> {
        let guard = self.ingredients.read().await;
        Ok(guard.iter().take(limit).cloned().collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Ingredient>, RepositoryError> {
        let guard = self.ingredients.read().await;
        Ok(guard.iter().find(|i| i.id == id).cloned())
    }

    async fn fetch_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        let guard = self.ingredients.read().await;
        Ok(guard
            .iter()
            .filter(|i| i.category == category)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_by_usage(&self, limit: usize) -> Result<Vec<Ingredient>, RepositoryError> {
        let guard = self.ingredients.read().await;
        let mut sorted: Vec<Ingredient> = guard.clone();
        sorted.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn update(&self, ingredient: Ingredient) -> Result<(), RepositoryError> {
        let mut guard = self.ingredients.write().await;
        match guard.iter_mut().find(|i| i.id == ingredient.id) {
            Some(existing) => {
                *existing = ingredient;
                Ok(())
            }
            None => Err(RepositoryError::QueryFailed(format!(
                "no ingredient with id {}",
                ingredient.id
            ))),
        }
    }
}
