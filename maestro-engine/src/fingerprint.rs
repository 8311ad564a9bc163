//! Skill fingerprints and pruning
//!
//! A fingerprint is a single embedding representing a whole skill, used to
//! prune irrelevant skills before per-chunk search. Fingerprints are
//! written once during indexing and read-only afterwards.

use maestro_rag::storage::cosine_similarity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Skills scoring at least this fraction of the top score are kept
const SCORE_FRACTION: f32 = 0.6;

/// Maximum number of skills kept by pruning
const MAX_MATCHED_SKILLS: usize = 8;

/// Per-skill metadata and its representative embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillFingerprint {
    /// Skill name (directory name)
    pub name: String,
    /// One-line skill description
    pub description: String,
    /// Domain tags
    pub domains: Vec<String>,
    /// Number of indexed chunks owned by the skill
    pub chunk_count: usize,
    /// Embedding of [`Self::fingerprint_text`], set during indexing
    pub embedding: Option<Vec<f32>>,
}

impl SkillFingerprint {
    /// The text that gets embedded to represent the skill
    #[must_use]
    pub fn fingerprint_text(&self) -> String {
        format!(
            "{}: {}. Domains: {}",
            self.name,
            self.description,
            self.domains.join(", ")
        )
    }
}

/// Prune skills by fingerprint similarity to the query embedding
///
/// Computes cosine similarity between the query vector and every
/// fingerprint embedding, sorts descending, keeps skills scoring at least
/// `0.6 ×` the top score, and caps the result at 8. An empty registry (or
/// one without embeddings) yields an empty vec, which callers treat as
/// "search all skills".
#[must_use]
pub fn match_skills(
    fingerprints: &HashMap<String, SkillFingerprint>,
    query_embedding: &[f32],
) -> Vec<String> {
    let mut scores: Vec<(&str, f32)> = fingerprints
        .values()
        .filter_map(|fp| {
            fp.embedding
                .as_ref()
                .map(|emb| (fp.name.as_str(), cosine_similarity(query_embedding, emb)))
        })
        .collect();

    if scores.is_empty() {
        return Vec::new();
    }

    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = scores[0].1 * SCORE_FRACTION;
    let matched: Vec<String> = scores
        .iter()
        .take_while(|(_, score)| *score >= threshold)
        .take(MAX_MATCHED_SKILLS)
        .map(|(name, _)| (*name).to_string())
        .collect();

    debug!(
        "fingerprint pruning kept {}/{} skills",
        matched.len(),
        fingerprints.len()
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(name: &str, embedding: Option<Vec<f32>>) -> SkillFingerprint {
        SkillFingerprint {
            name: name.to_string(),
            description: format!("{name} practices"),
            domains: vec![name.to_string()],
            chunk_count: 1,
            embedding,
        }
    }

    fn registry(entries: Vec<SkillFingerprint>) -> HashMap<String, SkillFingerprint> {
        entries.into_iter().map(|fp| (fp.name.clone(), fp)).collect()
    }

    #[test]
    fn test_fingerprint_text_format() {
        let fp = SkillFingerprint {
            name: "swift".into(),
            description: "Swift concurrency patterns".into(),
            domains: vec!["concurrency".into(), "swift".into()],
            chunk_count: 3,
            embedding: None,
        };
        assert_eq!(
            fp.fingerprint_text(),
            "swift: Swift concurrency patterns. Domains: concurrency, swift"
        );
    }

    #[test]
    fn test_match_keeps_skills_near_top_score() {
        let registry = registry(vec![
            fingerprint("close", Some(vec![1.0, 0.0])),
            fingerprint("nearby", Some(vec![0.9, 0.4359])), // cos ≈ 0.90
            fingerprint("far", Some(vec![0.0, 1.0])),       // cos = 0
        ]);

        let matched = match_skills(&registry, &[1.0, 0.0]);
        assert!(matched.contains(&"close".to_string()));
        assert!(matched.contains(&"nearby".to_string()));
        assert!(!matched.contains(&"far".to_string()));
        assert_eq!(matched[0], "close");
    }

    #[test]
    fn test_match_empty_registry() {
        assert!(match_skills(&HashMap::new(), &[1.0, 0.0]).is_empty());
    }

    #[test]
    fn test_match_ignores_missing_embeddings() {
        let registry = registry(vec![fingerprint("pending", None)]);
        assert!(match_skills(&registry, &[1.0, 0.0]).is_empty());
    }

    #[test]
    fn test_match_caps_at_eight() {
        let entries: Vec<SkillFingerprint> = (0..12)
            .map(|i| fingerprint(&format!("skill{i}"), Some(vec![1.0, 0.0])))
            .collect();
        let matched = match_skills(&registry(entries), &[1.0, 0.0]);
        assert_eq!(matched.len(), 8);
    }
}
