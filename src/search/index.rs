use std::sync::Arc;

use tracing::debug;

use crate::error::RepositoryError;

use super::ingredient::{Ingredient, IngredientRepository};

/// Bounds for repository fetches behind the index
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Candidate pool bound for a single search
    pub fetch_limit: usize,
    /// Result count when the caller does not pass one
    pub default_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            fetch_limit: 1000,
            default_limit: 20,
        }
    }
}

/// Fuzzy search and ranking over the ingredient corpus.
///
/// Scoring is additive: exact and substring matches on name and aliases,
/// an edit-distance similarity bonus, and a usage-count popularity term.
/// Ties keep the repository's fetch order (stable sort); that ordering is
/// an artifact, not a guarantee.
pub struct IngredientSearchIndex {
    repository: Arc<dyn IngredientRepository>,
    settings: SearchSettings,
}

impl IngredientSearchIndex {
    pub fn new(repository: Arc<dyn IngredientRepository>, settings: SearchSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Search the corpus, most relevant first
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        let query = query.to_lowercase();

        let candidates = self.repository.fetch_all(self.settings.fetch_limit).await?;

        let mut scored: Vec<(Ingredient, f64)> = candidates
            .into_iter()
            .filter_map(|ingredient| {
                let score = relevance_score(&ingredient, &query);
                (score > 0.0).then_some((ingredient, score))
            })
            .collect();

        // Stable by construction: sort_by preserves fetch order on ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        debug!("Search '{}' matched {} candidates", query, scored.len());

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(ingredient, _)| ingredient)
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Ingredient>, RepositoryError> {
        self.repository.fetch_by_id(id).await
    }

    pub async fn get_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Ingredient>, RepositoryError> {
        self.repository
            .fetch_by_category(category, self.settings.fetch_limit)
            .await
    }

    /// Most-used ingredients, descending
    pub async fn popular(&self, limit: usize) -> Result<Vec<Ingredient>, RepositoryError> {
        self.repository.fetch_by_usage(limit).await
    }

    /// Bump the usage counter for an ingredient.
    ///
    /// Read-modify-write without a transaction: usage count is an
    /// approximate popularity signal, so lost updates under concurrency are
    /// acceptable.
    pub async fn increment_usage(&self, id: &str) -> Result<(), RepositoryError> {
        if let Some(mut ingredient) = self.repository.fetch_by_id(id).await? {
            ingredient.usage_count += 1;
            self.repository.update(ingredient).await?;
        }
        Ok(())
    }

    /// Prompt context lines for the best matches against a description
    pub async fn context_for(
        &self,
        description: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let matches = self.search(description, Some(limit)).await?;
        Ok(matches.iter().map(Ingredient::context_line).collect())
    }
}

/// Additive relevance score; candidates scoring zero are excluded
fn relevance_score(ingredient: &Ingredient, query: &str) -> f64 {
    let mut score = 0.0;
    let name = ingredient.name.to_lowercase();

    if name == query {
        score += 100.0;
    } else if name.contains(query) {
        score += 50.0;
    }

    for alias in &ingredient.aliases {
        let alias = alias.to_lowercase();
        if alias == query {
            score += 80.0;
        } else if alias.contains(query) {
            score += 40.0;
        }
    }

    let distance = levenshtein(query, &name);
    let max_len = query.chars().count().max(name.chars().count());
    if max_len > 0 {
        let similarity = 1.0 - distance as f64 / max_len as f64;
        if similarity > 0.7 {
            score += similarity * 30.0;
        }
    }

    score += ingredient.usage_count as f64 * 0.5;

    score
}

/// Classic dynamic-programming edit distance over Unicode scalars.
///
/// Unit cost for insertion, deletion, and substitution; no transposition.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let m = a.len();
    let n = b.len();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1];
            } else {
                dp[i][j] = 1 + dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1]);
            }
        }
    }

    dp[m][n]
}
