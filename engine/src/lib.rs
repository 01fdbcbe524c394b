//! Ingredient-driven recipe recommendation: constraint filtering followed by TF-IDF cosine ranking.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod index;
pub mod persist;
pub mod query;
pub mod rank;
pub mod recommender;
pub mod tokenizer;
pub mod vectorizer;

pub use catalog::{Catalog, Recipe};
pub use error::{LoadError, LookupError, QueryParseError};
pub use index::{cosine, RecipeId, SimilarityIndex, SparseVector, TermId};
pub use query::{Constraint, Query, RawQuery};
pub use rank::{RankConfig, Recommendation, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K};
pub use recommender::Recommender;
pub use vectorizer::{Vectorizer, Weighting};
