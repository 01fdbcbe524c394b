#![allow(dead_code)]

use engine::{Catalog, Recipe, Recommender, SimilarityIndex, Weighting};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Dish<'a> {
    pub name: &'a str,
    pub ingredients: &'a str,
    pub total_time: Option<f64>,
    pub difficulty: Option<&'a str>,
    pub rating: Option<f64>,
}

impl<'a> Dish<'a> {
    pub fn new(name: &'a str, ingredients: &'a str) -> Self {
        Self { name, ingredients, total_time: None, difficulty: None, rating: None }
    }
    pub fn time(mut self, minutes: f64) -> Self { self.total_time = Some(minutes); self }
    pub fn difficulty(mut self, d: &'a str) -> Self { self.difficulty = Some(d); self }
    pub fn rating(mut self, r: f64) -> Self { self.rating = Some(r); self }
}

pub fn catalog(dishes: &[Dish<'_>]) -> Catalog {
    let recipes = dishes
        .iter()
        .enumerate()
        .map(|(id, d)| Recipe {
            id,
            name: d.name.to_string(),
            total_time: d.total_time,
            difficulty: d.difficulty.map(str::to_string),
            rating: d.rating,
            steps: None,
            extra: BTreeMap::from([("ingredients".to_string(), d.ingredients.to_string())]),
        })
        .collect();
    Catalog::from_recipes(recipes)
}

/// Catalog and index fitted over the dishes' ingredient texts, row for row.
pub fn recommender(dishes: &[Dish<'_>]) -> Recommender {
    let texts: Vec<&str> = dishes.iter().map(|d| d.ingredients).collect();
    let index = SimilarityIndex::fit(&texts, Weighting::default());
    Recommender::new(Arc::new(catalog(dishes)), Arc::new(index)).unwrap()
}
