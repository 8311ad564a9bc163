//! BM25 lexical index over chunk bodies
//!
//! Classic BM25 (Best Matching 25) relevance ranking from term frequency
//! and inverse document frequency.
//!
//! # Algorithm
//!
//! ```text
//! score(D, Q) = Σ IDF(qi) · (f(qi, D) · (k1 + 1)) / (f(qi, D) + k1 · (1 - b + b · |D| / avgdl))
//! ```
//!
//! Where:
//! - `IDF(qi)` = `ln(1 + (N − df(qi) + 0.5) / (df(qi) + 0.5))` — the
//!   non-negative variant
//! - `f(qi, D)` = frequency of qi in document D
//! - `k1` = term frequency saturation parameter (default: 1.5)
//! - `b` = length normalization parameter (default: 0.75)
//! - `|D|` = document length in tokens, `avgdl` = corpus average
//!
//! The index is immutable after [`Bm25Index::fit`]; re-indexing builds a
//! fresh instance.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// Case-folded word-run tokeniser
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Default term frequency saturation parameter
const DEFAULT_K1: f32 = 1.5;

/// Default length normalization parameter
const DEFAULT_B: f32 = 0.75;

/// In-memory BM25 index
#[derive(Debug, Clone)]
pub struct Bm25Index {
    k1: f32,
    b: f32,
    docs: Vec<Vec<String>>,
    ids: Vec<String>,
    doc_freq: HashMap<String, usize>,
    avg_doc_len: f32,
}

impl Bm25Index {
    /// Create an empty index with default parameters
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B)
    }

    /// Create an empty index with custom parameters
    ///
    /// Typical ranges: `k1` 1.2–2.0, `b` 0.5–0.9.
    #[must_use]
    pub fn with_params(k1: f32, b: f32) -> Self {
        Self {
            k1,
            b,
            docs: Vec::new(),
            ids: Vec::new(),
            doc_freq: HashMap::new(),
            avg_doc_len: 1.0,
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        WORD.find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Build the index over a document corpus
    ///
    /// `docs` and `ids` are parallel; each document's token list, the
    /// per-term document frequencies, and the average document length are
    /// computed here and held for scoring.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&mut self, docs: &[String], ids: &[String]) {
        self.docs = docs.iter().map(|d| Self::tokenize(d)).collect();
        self.ids = ids.to_vec();
        self.doc_freq.clear();

        let mut total = 0usize;
        for tokens in &self.docs {
            total += tokens.len();
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *self.doc_freq.entry(token.clone()).or_insert(0) += 1;
            }
        }
        self.avg_doc_len = if self.docs.is_empty() {
            1.0
        } else {
            total as f32 / self.docs.len() as f32
        };
        debug!(
            "fit BM25 over {} docs, avgdl {:.1}",
            self.docs.len(),
            self.avg_doc_len
        );
    }

    /// Number of indexed documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the index holds no documents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Score the corpus against a query, returning the top-k hits
    ///
    /// Only documents with a positive score are returned, ordered by score
    /// descending. An empty query returns no results.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, query: &str, top_k: usize) -> Vec<(String, f32)> {
        let query_tokens = Self::tokenize(query);
        if query_tokens.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let n = self.docs.len() as f32;
        let mut scored: Vec<(String, f32)> = Vec::new();

        for (i, tokens) in self.docs.iter().enumerate() {
            let mut term_freq: HashMap<&String, usize> = HashMap::new();
            for token in tokens {
                *term_freq.entry(token).or_insert(0) += 1;
            }

            let doc_len = tokens.len() as f32;
            let mut score = 0.0f32;
            for term in &query_tokens {
                let Some(&tf) = term_freq.get(term) else {
                    continue;
                };
                let tf = tf as f32;
                let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
                let idf = ((n - df + 0.5) / (df + 0.5)).ln_1p();
                let denominator = self
                    .k1
                    .mul_add(1.0 - self.b + self.b * doc_len / self.avg_doc_len, tf);
                score += idf * (tf * (self.k1 + 1.0)) / denominator;
            }

            if score > 0.0 {
                scored.push((self.ids[i].clone(), score));
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}
