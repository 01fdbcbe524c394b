use crate::catalog::Catalog;
use crate::error::{LoadError, QueryParseError};
use crate::filter;
use crate::index::SimilarityIndex;
use crate::query::{Query, RawQuery};
use crate::rank::{rank, RankConfig, Recommendation};
use std::sync::Arc;

/// Filter-then-rank recommendation over a shared, read-only catalog and index.
///
/// Cloning is cheap; clones share the same artifacts.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    index: Arc<SimilarityIndex>,
    config: RankConfig,
}

impl Recommender {
    /// Row `i` of `index` must describe recipe `i` of `catalog`; only the counts can be checked here.
    pub fn new(catalog: Arc<Catalog>, index: Arc<SimilarityIndex>) -> Result<Self, LoadError> {
        if catalog.len() != index.len() {
            return Err(LoadError::Misaligned { catalog: catalog.len(), index: index.len() });
        }
        Ok(Self { catalog, index, config: RankConfig::default() })
    }

    pub fn with_config(mut self, config: RankConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn index(&self) -> &SimilarityIndex { &self.index }

    pub fn recommend(&self, query: &Query) -> Vec<Recommendation> {
        let candidates = filter::apply(self.catalog.iter(), query);
        if candidates.is_empty() {
            tracing::debug!("no recipe passed the constraints");
            return Vec::new();
        }
        let q = self.index.vectorizer().transform(&query.ingredients);
        let results = rank(&candidates, &q, &self.index, self.config);
        tracing::debug!(
            candidates = candidates.len(),
            query_terms = q.nnz(),
            results = results.len(),
            "ranked recipes"
        );
        results
    }

    /// Parse form-style constraints, then recommend.
    pub fn recommend_raw(&self, raw: &RawQuery) -> Result<Vec<Recommendation>, QueryParseError> {
        let query = raw.parse()?;
        Ok(self.recommend(&query))
    }
}
