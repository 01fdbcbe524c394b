use crate::error::QueryParseError;
use serde::{Deserialize, Serialize};

/// Value that switches a constraint off.
pub const ANY: &str = "any";

/// A single optional constraint.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Constraint<T> {
    #[default]
    Any,
    Value(T),
}

/// Constraints as submitted by a form: free strings, with `any` as the sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default = "any")]
    pub max_time: String,
    #[serde(default = "any")]
    pub difficulty: String,
    #[serde(default = "any")]
    pub min_rating: String,
}

fn any() -> String { ANY.to_string() }

impl RawQuery {
    pub fn new(ingredients: impl Into<String>) -> Self {
        Self { ingredients: ingredients.into(), max_time: any(), difficulty: any(), min_rating: any() }
    }

    /// Turn the submitted strings into typed constraints. A value that is neither `any` nor a finite number is rejected.
    pub fn parse(&self) -> Result<Query, QueryParseError> {
        Ok(Query {
            ingredients: self.ingredients.clone(),
            max_time: parse_number("max_time", &self.max_time)?,
            difficulty: if self.difficulty == ANY {
                Constraint::Any
            } else {
                Constraint::Value(self.difficulty.clone())
            },
            min_rating: parse_number("min_rating", &self.min_rating)?,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<Constraint<f64>, QueryParseError> {
    let v = raw.trim();
    if v == ANY {
        return Ok(Constraint::Any);
    }
    v.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Constraint::Value)
        .ok_or_else(|| QueryParseError { field, value: raw.to_string() })
}

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub ingredients: String,
    /// Minutes
    pub max_time: Constraint<f64>,
    pub difficulty: Constraint<String>,
    pub min_rating: Constraint<f64>,
}

impl Query {
    pub fn new(ingredients: impl Into<String>) -> Self {
        Self { ingredients: ingredients.into(), ..Default::default() }
    }

    pub fn max_time(mut self, minutes: f64) -> Self {
        self.max_time = Constraint::Value(minutes);
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Constraint::Value(difficulty.into());
        self
    }

    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Constraint::Value(rating);
        self
    }
}
