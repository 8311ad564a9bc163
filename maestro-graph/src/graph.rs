//! Weighted concept graph with alias resolution and bounded expansion
//!
//! The graph is a flat adjacency map: every relation is stored in both
//! directions with its weight in `(0, 1]`. An alias table maps surface
//! tokens to canonical concept ids (`di` → `dependency injection`).
//!
//! Expansion walks outgoing edges from each resolved query token, records
//! each reached concept with the **maximum** weight seen along any path,
//! and returns the strongest candidates that were not already part of the
//! query.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::trace;

/// Query tokeniser, preserving leading `@` and `#` sigils
static QUERY_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@#]?\w+").expect("valid token pattern"));

/// Concept patterns recognised by [`ConceptGraph::extract_concepts_from_text`]
///
/// All patterns match case-insensitively; hits are lowercased afterwards.
static CONCEPT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)@\w+",
        r"(?i)#\w+",
        r"(?i)`([^`]+)`",
        r"(?i)\b(?:async|await|actor|sendable|nonisolated|isolated)\b",
        r"(?i)\b(?:Task|TaskGroup|AsyncSequence|AsyncStream)\b",
        r"(?i)\b(?:@Observable|@State|@Binding|@Environment|@Published)\b",
        r"(?i)\b(?:NavigationStack|NavigationPath|Sheet|Alert)\b",
        r"(?i)\b(?:ForEach|LazyVStack|LazyHStack|ScrollView)\b",
        r"(?i)\b(?:MVVM|TCA|VIPER|Coordinator)\b",
        r"(?i)\b(?:XCTest|Swift Testing|@Test|@Suite)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid concept pattern"))
    .collect()
});

/// Options controlling [`ConceptGraph::expand_with`]
#[derive(Debug, Clone, Copy)]
pub struct ExpansionOptions {
    /// Maximum number of expansion terms returned
    pub max_expansions: usize,
    /// Minimum edge weight for a neighbour to contribute
    pub min_weight: f32,
    /// Traversal depth; the weight threshold decays by 0.7 per extra hop
    pub depth: usize,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_expansions: 6,
            min_weight: 0.5,
            depth: 1,
        }
    }
}

/// Weighted undirected graph of concept relationships for query expansion
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    edges: HashMap<String, Vec<(String, f32)>>,
    aliases: HashMap<String, String>,
}

impl ConceptGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bidirectional relation between two concepts
    ///
    /// Concepts are lowercased; `weight` should be in `(0, 1]`.
    pub fn add_relation(&mut self, a: &str, b: &str, weight: f32) {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        self.edges
            .entry(a.clone())
            .or_default()
            .push((b.clone(), weight));
        self.edges.entry(b).or_default().push((a, weight));
    }

    /// Map a surface token to a canonical concept id
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_lowercase(), canonical.to_lowercase());
    }

    /// Number of concepts with at least one edge
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.edges.len()
    }

    /// Expand a query with related terms using default options
    #[must_use]
    pub fn expand(&self, query: &str) -> Vec<String> {
        self.expand_with(query, &ExpansionOptions::default())
    }

    /// Expand a query with related terms
    ///
    /// Tokenises the lowercased query (keeping `@`/`#` sigils), resolves
    /// each token through the alias table, then collects neighbours whose
    /// edge weight meets the threshold. Concepts already present in the
    /// query or its alias resolution are excluded. Results are ordered by
    /// recorded weight descending, ties broken by insertion order, and
    /// capped at `max_expansions`.
    #[must_use]
    pub fn expand_with(&self, query: &str, opts: &ExpansionOptions) -> Vec<String> {
        let query_lower = query.to_lowercase();
        let query_tokens: HashSet<String> = QUERY_TOKENS
            .find_iter(&query_lower)
            .map(|m| m.as_str().to_string())
            .collect();

        let resolved: HashSet<String> = query_tokens
            .iter()
            .map(|t| self.aliases.get(t).cloned().unwrap_or_else(|| t.clone()))
            .collect();

        // Insertion-ordered candidate list with max-weight recording.
        let mut order: Vec<String> = Vec::new();
        let mut weights: HashMap<String, f32> = HashMap::new();
        for seed in &resolved {
            let mut visited = HashSet::new();
            self.collect_neighbors(
                seed,
                opts.depth,
                opts.min_weight,
                &mut order,
                &mut weights,
                &mut visited,
            );
        }

        trace!(
            "expand: {} seeds -> {} candidates",
            resolved.len(),
            order.len()
        );

        let mut ranked: Vec<String> = order
            .into_iter()
            .filter(|c| !resolved.contains(c) && !query_tokens.contains(c))
            .collect();
        // Stable sort preserves insertion order among equal weights.
        ranked.sort_by(|a, b| {
            weights[b]
                .partial_cmp(&weights[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(opts.max_expansions);
        ranked
    }

    fn collect_neighbors(
        &self,
        concept: &str,
        depth: usize,
        min_weight: f32,
        order: &mut Vec<String>,
        weights: &mut HashMap<String, f32>,
        visited: &mut HashSet<String>,
    ) {
        if depth == 0 || !visited.insert(concept.to_string()) {
            return;
        }
        let Some(neighbors) = self.edges.get(concept) else {
            return;
        };
        for (neighbor, weight) in neighbors {
            if *weight < min_weight {
                continue;
            }
            match weights.get_mut(neighbor) {
                Some(recorded) => {
                    if *weight > *recorded {
                        *recorded = *weight;
                    }
                }
                None => {
                    order.push(neighbor.clone());
                    weights.insert(neighbor.clone(), *weight);
                }
            }
            if depth > 1 {
                self.collect_neighbors(
                    neighbor,
                    depth - 1,
                    min_weight * 0.7,
                    order,
                    weights,
                    visited,
                );
            }
        }
    }

    /// Extract concept-like tokens from skill text
    ///
    /// Pulls sigil-prefixed identifiers, backtick spans, and a fixed set of
    /// domain keywords out of the text, lowercased, deduplicated, sorted.
    /// Intended for growing the graph from corpus content.
    #[must_use]
    pub fn extract_concepts_from_text(&self, text: &str) -> Vec<String> {
        let mut concepts: HashSet<String> = HashSet::new();
        for pattern in CONCEPT_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                concepts.insert(m.as_str().trim_matches('`').to_lowercase());
            }
        }
        let mut out: Vec<String> = concepts.into_iter().collect();
        out.sort();
        out
    }
}
