//! Shared types for the search pipeline

use maestro_rag::Chunk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A retrieved chunk with its ranking provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Final ranking score (RRF score, or the rerank score when reranked)
    pub final_score: f32,
    /// Zero-based rank in the semantic candidate list, if present there
    pub semantic_rank: Option<usize>,
    /// Zero-based rank in the BM25 candidate list, if present there
    pub bm25_rank: Option<usize>,
    /// Cross-encoder score, when reranking ran
    pub rerank_score: Option<f32>,
}

/// Response of a search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The literal query as issued
    pub query: String,
    /// Ranked results, best first
    pub results: Vec<SearchResult>,
    /// Distinct skills of the returned chunks, sorted
    pub skills_used: Vec<String>,
    /// Wall-clock duration of the search in milliseconds
    pub time_ms: f64,
    /// Whether this response was served from the query cache
    pub from_cache: bool,
    /// Terms the concept graph added to the query, if any
    pub expanded_terms: Option<Vec<String>>,
}

impl SearchResponse {
    /// Serialise the results into a markdown context block
    ///
    /// Produces a `# Relevant Knowledge (<skills>)` header followed by one
    /// `## [skill] file — section` block per result. Token accounting uses
    /// the `tokens ≈ len/4` approximation; blocks are appended greedily and
    /// the first block that would exceed `max_tokens` stops the process.
    /// An empty result set yields the empty string.
    #[must_use]
    pub fn to_context(&self, max_tokens: usize) -> String {
        if self.results.is_empty() {
            return String::new();
        }

        let mut lines = vec![format!(
            "# Relevant Knowledge ({})\n",
            self.skills_used.join(", ")
        )];
        let mut used = 0;
        for result in &self.results {
            let block = format!(
                "## [{}] {} — {}\n\n{}\n\n---\n",
                result.chunk.skill, result.chunk.file, result.chunk.section, result.chunk.text
            );
            let tokens = block.len() / 4;
            if used + tokens > max_tokens {
                break;
            }
            lines.push(block);
            used += tokens;
        }
        lines.join("\n")
    }
}

/// Outcome of an indexing run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexReport {
    /// Skills that produced at least one chunk
    pub skills: usize,
    /// Unique files chunked
    pub files: usize,
    /// Chunks indexed
    pub chunks: usize,
    /// Fingerprints recorded
    pub fingerprints: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Per-file errors, as `"skill/file: error"`; indexing continued past them
    pub errors: Vec<String>,
}

/// Per-skill entry of the status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillStatus {
    /// Indexed chunk count of the skill
    pub chunks: usize,
    /// Domain tags of the skill
    pub domains: Vec<String>,
    /// Skill description
    pub description: String,
}

/// Index state exposed to callers (CLI/tool-server surfaces)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineStatus {
    /// Whether a usable index exists
    pub indexed: bool,
    /// Chunks in the vector store
    pub total_chunks: usize,
    /// Documents in the BM25 index
    pub bm25_docs: usize,
    /// Per-skill breakdown
    pub skills: BTreeMap<String, SkillStatus>,
}
