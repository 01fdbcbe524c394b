use crate::index::RecipeId;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the artifacts the engine is started from.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Meta {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("catalog row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidField { row: usize, column: &'static str, value: String },

    #[error("unsupported artifact version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },

    #[error("catalog has {catalog} recipes but the similarity index has {index} rows")]
    Misaligned { catalog: usize, index: usize },

    #[error("meta.json records {meta} recipes but the catalog has {catalog}")]
    MetaMismatch { meta: usize, catalog: usize },

    #[error("corrupt similarity index: {0}")]
    Corrupt(String),
}

/// A submitted constraint that is neither `any` nor a valid number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid value '{value}' for {field}: expected a number or 'any'")]
pub struct QueryParseError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no recipe named '{0}'")]
    NotFound(String),

    #[error("no recipe with id {0}")]
    UnknownId(RecipeId),

    #[error("{} recipes are named '{name}'", .ids.len())]
    Ambiguous { name: String, ids: Vec<RecipeId> },
}
