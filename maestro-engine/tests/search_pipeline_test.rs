//! End-to-end tests of the search pipeline stages

mod common;

use common::{skills_root, test_config, test_engine, write_skill};
use maestro_engine::prelude::*;
use maestro_rag::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_single_skill_concurrency_scenario() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[(
            "concurrency.md",
            "## Concurrency\n\nSendable conformance for actors avoids data races.\n",
        )],
    );

    let engine = test_engine(test_config(tmp.path()));
    let response = engine.search("sendable warning", None).await.unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].chunk.skill, "swift");
    assert_eq!(response.results[0].chunk.section, "Concurrency");

    let expanded = response.expanded_terms.unwrap();
    assert!(
        expanded.iter().any(|t| t == "actor isolation")
            || expanded.iter().any(|t| t == "data race")
            || expanded.iter().any(|t| t == "thread safety")
    );
}

#[tokio::test]
async fn test_fingerprint_pruning_filters_semantic_search() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "a",
        Some("---\ndescription: Actor isolation and concurrency safety\n---\n"),
        &[(
            "actors.md",
            "## Isolation\n\nActor isolation keeps concurrency safe by serializing access.\n",
        )],
    );
    write_skill(
        &skills,
        "b",
        Some("---\ndescription: Database migrations and schema design\n---\n"),
        &[(
            "migrations.md",
            "## Schema\n\nDatabase migrations evolve schema tables incrementally.\n",
        )],
    );

    let engine = test_engine(test_config(tmp.path()));
    engine.index(None, false).await.unwrap();

    let embedder = LocalEmbedding::minilm();
    let query_embedding = embedder
        .embed_query("actor isolation concurrency")
        .await
        .unwrap();
    assert_eq!(engine.match_skills(&query_embedding), vec!["a"]);

    let response = engine
        .search("actor isolation concurrency", None)
        .await
        .unwrap();
    assert!(!response.results.is_empty());
    assert!(response.results.iter().all(|r| r.chunk.skill == "a"));
    assert_eq!(response.skills_used, vec!["a"]);
}

#[tokio::test]
async fn test_bm25_only_hit_outside_matched_skills() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "a",
        Some("---\ndescription: Actor isolation and concurrency safety\n---\n"),
        &[(
            "actors.md",
            "## Isolation\n\nActor isolation keeps concurrency safe.\n",
        )],
    );
    write_skill(
        &skills,
        "b",
        Some("---\ndescription: Database migrations and schema design\n---\n"),
        &[(
            "legacy.md",
            "## Flags\n\nThe frobnicate flag toggles legacy parsing.\n",
        )],
    );

    let engine = test_engine(test_config(tmp.path()));
    engine.index(None, false).await.unwrap();

    // Fingerprints prune to skill a, so b's chunk can only arrive via BM25
    let response = engine
        .search("actor isolation frobnicate", None)
        .await
        .unwrap();

    let lexical_hit = response
        .results
        .iter()
        .find(|r| r.chunk.skill == "b")
        .expect("rare-term chunk should surface through BM25");
    assert!(lexical_hit.bm25_rank.is_some());
    assert!(lexical_hit.semantic_rank.is_none());
}

#[tokio::test]
async fn test_cache_exact_and_semantic_hits() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[("actors.md", "## Actors\n\nActor isolation rules for Swift.\n")],
    );

    let engine = test_engine(test_config(tmp.path()));
    let first = engine.search("actor isolation rules", None).await.unwrap();
    assert!(!first.from_cache);

    // Exact repeat
    let repeat = engine.search("actor isolation rules", None).await.unwrap();
    assert!(repeat.from_cache);
    assert_eq!(repeat.results.len(), first.results.len());
    for (a, b) in repeat.results.iter().zip(&first.results) {
        assert_eq!(a.chunk.id, b.chunk.id);
    }

    // Same token multiset, different order: semantic hit at similarity 1.0
    let semantic = engine.search("rules isolation actor", None).await.unwrap();
    assert!(semantic.from_cache);
    for (a, b) in semantic.results.iter().zip(&first.results) {
        assert_eq!(a.chunk.id, b.chunk.id);
    }

    // The cached copy itself is never flagged, so repeats stay hits
    let again = engine.search("actor isolation rules", None).await.unwrap();
    assert!(again.from_cache);
}

#[tokio::test]
async fn test_cache_disabled_never_serves_cached() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(&skills, "swift", None, &[("a.md", "## A\n\nActor notes.\n")]);

    let config = MaestroConfig {
        cache_enabled: false,
        ..test_config(tmp.path())
    };
    let engine = test_engine(config);

    engine.search("actor notes", None).await.unwrap();
    let repeat = engine.search("actor notes", None).await.unwrap();
    assert!(!repeat.from_cache);
}

#[tokio::test]
async fn test_rrf_order_without_reranker() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[
            ("a.md", "## One\n\nActor isolation avoids data races.\n"),
            ("b.md", "## Two\n\nSendable closures cross isolation boundaries.\n"),
            ("c.md", "## Three\n\nTask groups structure concurrency.\n"),
        ],
    );

    let config = MaestroConfig {
        reranker_enabled: false,
        ..test_config(tmp.path())
    };
    let engine = test_engine(config);
    let response = engine.search("actor isolation sendable", None).await.unwrap();

    assert!(!response.results.is_empty());
    // RRF scores monotone non-increasing, no rerank scores anywhere
    assert!(response
        .results
        .windows(2)
        .all(|w| w[0].final_score >= w[1].final_score));
    assert!(response.results.iter().all(|r| r.rerank_score.is_none()));
}

/// Reranker stub scoring passages by length
struct LengthReranker;

#[async_trait::async_trait]
impl Reranker for LengthReranker {
    #[allow(clippy::cast_precision_loss)]
    async fn predict(&self, pairs: &[(String, String)]) -> maestro_engine::Result<Vec<f32>> {
        Ok(pairs.iter().map(|(_, passage)| passage.len() as f32).collect())
    }
}

/// Reranker stub that always fails
struct BrokenReranker;

#[async_trait::async_trait]
impl Reranker for BrokenReranker {
    async fn predict(&self, _pairs: &[(String, String)]) -> maestro_engine::Result<Vec<f32>> {
        Err(EngineError::Embedding("model unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_reranker_determines_final_order() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[
            ("short.md", "## S\n\nActor isolation.\n"),
            (
                "long.md",
                "## L\n\nActor isolation with a much longer explanation of data races.\n",
            ),
        ],
    );

    let engine = MaestroEngine::builder(test_config(tmp.path()))
        .with_embedding_provider(Arc::new(LocalEmbedding::minilm()))
        .with_vector_store(Arc::new(InMemoryVectorStore::new()))
        .with_reranker(Arc::new(LengthReranker))
        .build()
        .unwrap();

    let response = engine.search("actor isolation", None).await.unwrap();
    assert!(response.results.len() >= 2);

    for result in &response.results {
        let rerank = result.rerank_score.expect("reranker ran");
        assert!((result.final_score - rerank).abs() < f32::EPSILON);
    }
    // Relative order equals relative rerank score order (longest passage first)
    assert!(response
        .results
        .windows(2)
        .all(|w| w[0].rerank_score.unwrap() >= w[1].rerank_score.unwrap()));
    assert_eq!(response.results[0].chunk.file, "long.md");
}

#[tokio::test]
async fn test_reranker_failure_keeps_fusion_order() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[
            ("a.md", "## One\n\nActor isolation avoids data races.\n"),
            ("b.md", "## Two\n\nSendable closures cross boundaries.\n"),
        ],
    );

    let engine = MaestroEngine::builder(test_config(tmp.path()))
        .with_embedding_provider(Arc::new(LocalEmbedding::minilm()))
        .with_vector_store(Arc::new(InMemoryVectorStore::new()))
        .with_reranker(Arc::new(BrokenReranker))
        .build()
        .unwrap();

    let response = engine.search("actor isolation", None).await.unwrap();
    assert!(!response.results.is_empty());
    assert!(response.results.iter().all(|r| r.rerank_score.is_none()));
    assert!(response
        .results
        .windows(2)
        .all(|w| w[0].final_score >= w[1].final_score));
}

#[tokio::test]
async fn test_top_k_bounds_results() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    let files: Vec<(String, String)> = (0..10)
        .map(|i| {
            (
                format!("f{i}.md"),
                format!("## S{i}\n\nActor isolation note number {i} about data races.\n"),
            )
        })
        .collect();
    let file_refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    write_skill(&skills, "swift", None, &file_refs);

    let engine = test_engine(test_config(tmp.path()));
    let response = engine.search("actor isolation", Some(3)).await.unwrap();
    assert!(response.results.len() <= 3);
}

#[tokio::test]
async fn test_query_without_concept_matches_still_runs() {
    let tmp = TempDir::new().unwrap();
    let skills = skills_root(tmp.path());
    write_skill(
        &skills,
        "swift",
        None,
        &[("a.md", "## Notes\n\nPlain body about structured logging.\n")],
    );

    let engine = test_engine(test_config(tmp.path()));
    let response = engine.search("structured logging", None).await.unwrap();
    assert!(response.expanded_terms.is_none());
    assert!(!response.results.is_empty());
}

#[tokio::test]
async fn test_empty_corpus_returns_empty() {
    let tmp = TempDir::new().unwrap();
    skills_root(tmp.path());

    let engine = test_engine(test_config(tmp.path()));
    let response = engine.search("anything at all", None).await.unwrap();
    assert!(response.results.is_empty());
    assert!(response.skills_used.is_empty());

    let status = engine.status().await;
    assert!(!status.indexed);
}
