use crate::error::LoadError;
use crate::vectorizer::Vectorizer;
use serde::{Deserialize, Serialize};

pub type TermId = u32;
pub type RecipeId = usize;

/// Sparse term-weight vector. `indices` are strictly increasing and parallel to `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<TermId>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn new() -> Self { Self::default() }

    /// Build from unordered (term, weight) pairs. Duplicate terms are summed, zero weights dropped.
    pub fn from_pairs(mut pairs: Vec<(TermId, f32)>) -> Self {
        pairs.sort_by_key(|(t, _)| *t);
        let mut v = SparseVector::new();
        for (term, weight) in pairs {
            if v.indices.last() == Some(&term) {
                if let Some(last) = v.values.last_mut() { *last += weight; }
            } else {
                v.indices.push(term);
                v.values.push(weight);
            }
        }
        let (indices, values) = v
            .indices
            .into_iter()
            .zip(v.values)
            .filter(|(_, w)| *w != 0.0)
            .unzip();
        SparseVector { indices, values }
    }

    pub fn nnz(&self) -> usize { self.indices.len() }

    pub fn is_zero(&self) -> bool { self.values.iter().all(|w| *w == 0.0) }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|w| w * w).sum::<f32>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut acc = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }

    /// Scale to unit length in place. The zero vector is left unchanged.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for w in self.values.iter_mut() { *w /= norm; }
        }
    }
}

/// Cosine similarity between two sparse vectors, in [0, 1] for non-negative weights.
///
/// Either vector being all zero yields 0.0.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let na = a.norm();
    let nb = b.norm();
    if na > 0.0 && nb > 0.0 {
        (a.dot(b) / (na * nb)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Fitted vectorizer plus one weight row per catalog recipe. Row `i` belongs to recipe id `i`.
///
/// Only built through `new` or `fit`; persisted as its parts.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectorizer: Vectorizer,
    rows: Vec<SparseVector>,
}

impl SimilarityIndex {
    /// Assemble an index from loaded parts, rejecting rows that reference terms outside the vocabulary.
    pub fn new(vectorizer: Vectorizer, rows: Vec<SparseVector>) -> Result<Self, LoadError> {
        vectorizer.validate()?;
        let vocab = vectorizer.vocabulary_len();
        for (row, v) in rows.iter().enumerate() {
            let ordered = v.indices.windows(2).all(|w| w[0] < w[1]);
            if !ordered || v.indices.len() != v.values.len() {
                return Err(LoadError::Corrupt(format!("matrix row {row} is not a sorted sparse vector")));
            }
            if let Some(&term) = v.indices.iter().find(|&&t| t as usize >= vocab) {
                return Err(LoadError::Corrupt(format!(
                    "matrix row {row} references term {term} outside a vocabulary of {vocab}"
                )));
            }
        }
        Ok(Self { vectorizer, rows })
    }

    /// Fit a fresh index over one ingredient text per recipe, in catalog order.
    pub fn fit<S: AsRef<str>>(docs: &[S], weighting: crate::vectorizer::Weighting) -> Self {
        let (vectorizer, rows) = Vectorizer::fit(docs, weighting);
        Self { vectorizer, rows }
    }

    pub fn vectorizer(&self) -> &Vectorizer { &self.vectorizer }

    pub fn rows(&self) -> &[SparseVector] { &self.rows }

    pub fn row(&self, id: RecipeId) -> Option<&SparseVector> { self.rows.get(id) }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
