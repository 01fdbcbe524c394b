use crate::catalog::Recipe;
use crate::index::{cosine, RecipeId, SimilarityIndex, SparseVector};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Matches at or below this similarity are dropped.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.4;
/// Most results returned for one query.
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankConfig {
    pub threshold: f32,
    pub top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_SIMILARITY_THRESHOLD, top_k: DEFAULT_TOP_K }
    }
}

/// One ranked result: the recipe's fields plus its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: RecipeId,
    pub name: String,
    pub total_time: Option<f64>,
    pub difficulty: Option<String>,
    pub steps: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    pub similarity: f32,
    /// Missing ratings are reported as 0
    pub rating: f64,
}

impl Recommendation {
    fn new(recipe: &Recipe, similarity: f32) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            total_time: recipe.total_time,
            difficulty: recipe.difficulty.clone(),
            steps: recipe.steps.clone(),
            extra: recipe.extra.clone(),
            similarity,
            rating: recipe.rating_or_zero(),
        }
    }
}

/// Highest similarity first, then highest rating. Callers must sort stably so full ties keep input order.
pub fn by_similarity_then_rating(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.rating.total_cmp(&a.rating))
}

/// Score `candidates` against an already vectorized query, keep those above the threshold, sort and truncate.
pub fn rank(
    candidates: &[&Recipe],
    query: &SparseVector,
    index: &SimilarityIndex,
    config: RankConfig,
) -> Vec<Recommendation> {
    let mut scored: Vec<Recommendation> = candidates
        .iter()
        .filter_map(|recipe| {
            let similarity = index.row(recipe.id).map(|row| cosine(query, row)).unwrap_or(0.0);
            (similarity > config.threshold).then(|| Recommendation::new(recipe, similarity))
        })
        .collect();
    // Vec::sort_by is stable
    scored.sort_by(by_similarity_then_rating);
    scored.truncate(config.top_k);
    scored
}
