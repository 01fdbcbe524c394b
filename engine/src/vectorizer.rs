use crate::error::LoadError;
use crate::index::{SparseVector, TermId};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Term weighting scheme, stored with the fitted model so queries are weighted exactly like the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weighting {
    /// Use `1 + ln(tf)` instead of raw counts
    pub sublinear_tf: bool,
    /// Use idf = ln((1 + n) / (1 + df)) + 1 instead of ln(n / df) + 1
    pub smooth_idf: bool,
}

impl Default for Weighting {
    fn default() -> Self {
        Self { sublinear_tf: false, smooth_idf: true }
    }
}

impl Weighting {
    fn tf(&self, raw: u32) -> f32 {
        if raw == 0 {
            0.0
        } else if self.sublinear_tf {
            1.0 + (raw as f32).ln()
        } else {
            raw as f32
        }
    }

    fn idf(&self, n: u32, df: u32) -> f32 {
        if self.smooth_idf {
            ((1.0 + n as f32) / (1.0 + df as f32)).ln() + 1.0
        } else {
            let df = df.max(1);
            ((n.max(1) as f32) / (df as f32)).ln() + 1.0
        }
    }
}

/// A fitted TF-IDF model. The vocabulary and idf table never change after fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    vocabulary: HashMap<String, TermId>,
    idf: Vec<f32>,
    weighting: Weighting,
}

impl Vectorizer {
    /// Fit vocabulary and idf over `docs`, returning the model and the L2-normalized row for each document.
    pub fn fit<S: AsRef<str>>(docs: &[S], weighting: Weighting) -> (Self, Vec<SparseVector>) {
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d.as_ref())).collect();

        // Sorted term order keeps term ids stable across refits of the same corpus.
        let mut df_by_term: BTreeMap<&str, u32> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df_by_term.entry(term).or_insert(0) += 1;
            }
        }

        let n = tokenized.len() as u32;
        let mut vocabulary = HashMap::with_capacity(df_by_term.len());
        let mut idf = Vec::with_capacity(df_by_term.len());
        for (tid, (term, df)) in df_by_term.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), tid as TermId);
            idf.push(weighting.idf(n, df));
        }

        let model = Self { vocabulary, idf, weighting };
        let rows = tokenized.iter().map(|tokens| model.weigh(tokens)).collect();
        tracing::debug!(docs = n, terms = model.idf.len(), "fitted vectorizer");
        (model, rows)
    }

    /// Vectorize text against the frozen vocabulary. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut tf_raw: HashMap<TermId, u32> = HashMap::new();
        for term in tokens {
            if let Some(&tid) = self.vocabulary.get(term) {
                *tf_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let pairs = tf_raw
            .into_iter()
            .map(|(tid, raw)| (tid, self.weighting.tf(raw) * self.idf[tid as usize]))
            .collect();
        let mut v = SparseVector::from_pairs(pairs);
        v.l2_normalize();
        v
    }

    pub fn vocabulary_len(&self) -> usize { self.vocabulary.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.vocabulary.get(term).copied() }

    /// Check that the vocabulary and idf table describe the same term space.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(LoadError::Corrupt(format!(
                "vectorizer has {} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        if let Some((term, tid)) = self.vocabulary.iter().find(|(_, tid)| **tid as usize >= self.idf.len()) {
            return Err(LoadError::Corrupt(format!("term '{term}' has out-of-range id {tid}")));
        }
        Ok(())
    }
}
