use crate::catalog::Recipe;
use crate::query::{Constraint, Query};

/// Predicate over catalog rows.
pub trait RecipeFilter {
    fn matches(&self, recipe: &Recipe) -> bool;
}

/// `total_time <= max`. Recipes without a recorded time never match.
pub struct MaxTime(pub f64);

impl RecipeFilter for MaxTime {
    fn matches(&self, recipe: &Recipe) -> bool {
        recipe.total_time.map(|t| t <= self.0).unwrap_or(false)
    }
}

/// Exact, case-sensitive difficulty match.
pub struct Difficulty(pub String);

impl RecipeFilter for Difficulty {
    fn matches(&self, recipe: &Recipe) -> bool {
        recipe.difficulty.as_deref() == Some(self.0.as_str())
    }
}

/// `rating >= min`, with a missing rating read as 0.
pub struct MinRating(pub f64);

impl RecipeFilter for MinRating {
    fn matches(&self, recipe: &Recipe) -> bool {
        recipe.rating_or_zero() >= self.0
    }
}

/// The filters a query switches on, in application order. `Any` constraints contribute nothing.
pub fn filters_for(query: &Query) -> Vec<Box<dyn RecipeFilter>> {
    let mut filters: Vec<Box<dyn RecipeFilter>> = Vec::new();
    if let Constraint::Value(max) = query.max_time {
        filters.push(Box::new(MaxTime(max)));
    }
    if let Constraint::Value(d) = &query.difficulty {
        filters.push(Box::new(Difficulty(d.clone())));
    }
    if let Constraint::Value(min) = query.min_rating {
        filters.push(Box::new(MinRating(min)));
    }
    filters
}

/// Recipes that pass every active constraint, in catalog order.
pub fn apply<'a, I>(recipes: I, query: &Query) -> Vec<&'a Recipe>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let filters = filters_for(query);
    recipes
        .into_iter()
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .collect()
}
