//! Indexing and the five-stage search pipeline
//!
//! The engine owns the vector store, the BM25 index, the fingerprint
//! registry, the query cache, and the concept graph, and orchestrates them
//! into one retrieval pipeline. Search stages, in order: cache lookup,
//! concept expansion, fingerprint pruning, hybrid retrieval, reciprocal
//! rank fusion, optional cross-encoder reranking, truncation.
//!
//! Indexing builds the BM25 index and fingerprint registry aside and swaps
//! them in atomically once every store write has finished; `index()` calls
//! serialise on a mutex, so a search never observes a half-built snapshot.

use crate::bm25::Bm25Index;
use crate::cache::QueryCache;
use crate::config::MaestroConfig;
use crate::error::{EngineError, Result};
use crate::fingerprint::{match_skills, SkillFingerprint};
use crate::rerank::Reranker;
use crate::types::{EngineStatus, IndexReport, SearchResponse, SearchResult, SkillStatus};
use maestro_graph::{swift_concept_graph, ConceptGraph};
use maestro_rag::chunking::MarkdownChunker;
use maestro_rag::embeddings::{create_provider, EmbeddingProvider};
use maestro_rag::skills::{discover_skills, markdown_files, SkillManifest};
use maestro_rag::storage::{
    FilesystemVectorStore, MetadataFilter, StoredDocument, VectorRecord, VectorStore,
};
use maestro_rag::Chunk;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Chunk embedding batch size for document-mode embedding
const EMBED_BATCH_SIZE: usize = 64;

/// Reciprocal rank fusion constant
const RRF_K: usize = 60;

/// Add one list's `1 / (k + rank + 1)` contribution for a chunk id
#[allow(clippy::cast_precision_loss)]
fn accumulate_rrf(order: &mut Vec<String>, rrf: &mut HashMap<String, f32>, id: &str, rank: usize) {
    let contribution = 1.0 / (RRF_K + rank + 1) as f32;
    if let Some(score) = rrf.get_mut(id) {
        *score += contribution;
    } else {
        order.push(id.to_string());
        rrf.insert(id.to_string(), contribution);
    }
}

/// Immutable index snapshot swapped in whole by `index()`
#[derive(Debug, Default)]
struct IndexState {
    bm25: Bm25Index,
    fingerprints: HashMap<String, SkillFingerprint>,
    indexed: bool,
}

/// Builder for [`MaestroEngine`]
pub struct MaestroEngineBuilder {
    config: MaestroConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    reranker: Option<Arc<dyn Reranker>>,
    graph: Option<ConceptGraph>,
}

impl std::fmt::Debug for MaestroEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaestroEngineBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MaestroEngineBuilder {
    /// Override the embedding provider
    #[must_use]
    pub fn with_embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override the vector store
    #[must_use]
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a cross-encoder reranker
    #[must_use]
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Override the concept graph
    #[must_use]
    pub fn with_concept_graph(mut self, graph: ConceptGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Build the engine
    ///
    /// Unset collaborators fall back to the configuration: the embedding
    /// provider comes from `embedding_provider`, the store is a filesystem
    /// store under `vectordb_path`. A store that fails to open leaves the
    /// engine degraded: indexing errors, search returns empty.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when the configured embedding provider
    /// cannot be created (e.g. the remote provider without its API key).
    pub fn build(self) -> Result<MaestroEngine> {
        let config = self.config;

        let embedder = match self.embedder {
            Some(embedder) => embedder,
            None => create_provider(&config.embedding_config())
                .map_err(|e| EngineError::Config(e.to_string()))?,
        };

        let store: Option<Arc<dyn VectorStore>> = match self.store {
            Some(store) => Some(store),
            None => match FilesystemVectorStore::open(&config.vectordb_path) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!("vector store unavailable: {e}");
                    None
                }
            },
        };

        Ok(MaestroEngine {
            config,
            embedder,
            store,
            reranker: self.reranker,
            graph: self.graph.unwrap_or_else(swift_concept_graph),
            cache: QueryCache::new(),
            state: RwLock::new(Arc::new(IndexState::default())),
            index_lock: tokio::sync::Mutex::new(()),
        })
    }
}

/// The retrieval engine
pub struct MaestroEngine {
    config: MaestroConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Option<Arc<dyn VectorStore>>,
    reranker: Option<Arc<dyn Reranker>>,
    graph: ConceptGraph,
    cache: QueryCache,
    state: RwLock<Arc<IndexState>>,
    index_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for MaestroEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaestroEngine")
            .field("config", &self.config)
            .field("cached_queries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl MaestroEngine {
    /// Start building an engine from a configuration
    #[must_use]
    pub fn builder(config: MaestroConfig) -> MaestroEngineBuilder {
        MaestroEngineBuilder {
            config,
            embedder: None,
            store: None,
            reranker: None,
            graph: None,
        }
    }

    /// Index skill directories
    ///
    /// Chunks every markdown file of every skill (explicit `paths` or the
    /// configured roots), embeds the chunks in document mode, writes them
    /// to the vector store, embeds one fingerprint per chunk-producing
    /// skill, rebuilds the BM25 index, and persists the index-meta
    /// document. Per-file read failures are collected into the report's
    /// `errors` and do not abort the run.
    ///
    /// # Errors
    ///
    /// Embedding and store failures are fatal to the call; the previous
    /// index snapshot stays in place.
    pub async fn index(&self, paths: Option<Vec<PathBuf>>, force: bool) -> Result<IndexReport> {
        let _guard = self.index_lock.lock().await;
        let started = Instant::now();

        let store = self
            .store
            .as_ref()
            .ok_or_else(|| EngineError::Store("vector store unavailable".to_string()))?
            .clone();

        let skill_dirs = paths.unwrap_or_else(|| discover_skills(&self.config.skill_paths));
        let chunker = MarkdownChunker::new(self.config.chunk_max_tokens);

        let mut all_chunks: Vec<Chunk> = Vec::new();
        let mut fingerprints: HashMap<String, SkillFingerprint> = HashMap::new();
        let mut errors: Vec<String> = Vec::new();

        for skill_dir in &skill_dirs {
            if !skill_dir.is_dir() {
                continue;
            }
            let manifest = SkillManifest::load(skill_dir);

            let mut skill_chunks: Vec<Chunk> = Vec::new();
            for md_file in markdown_files(skill_dir) {
                match chunker.chunk_file(&md_file, &manifest.name, &manifest.domains) {
                    Ok(chunks) => skill_chunks.extend(chunks),
                    Err(e) => {
                        let file_name = md_file
                            .file_name()
                            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
                        errors.push(format!("{}/{file_name}: {e}", manifest.name));
                    }
                }
            }

            if skill_chunks.is_empty() {
                continue;
            }
            fingerprints.insert(
                manifest.name.clone(),
                SkillFingerprint {
                    name: manifest.name.clone(),
                    description: manifest.description,
                    domains: manifest.domains,
                    chunk_count: skill_chunks.len(),
                    embedding: None,
                },
            );
            all_chunks.extend(skill_chunks);
        }

        if all_chunks.is_empty() {
            debug!("no chunks produced; leaving the previous index in place");
            return Ok(IndexReport {
                errors,
                ..IndexReport::default()
            });
        }

        if force {
            let removed = store.delete(None).await?;
            debug!("force reindex dropped {removed} records");
        }

        self.store_chunks(&store, &all_chunks).await?;
        self.embed_fingerprints(&mut fingerprints).await?;

        let mut bm25 = Bm25Index::new();
        let docs: Vec<String> = all_chunks.iter().map(|c| c.text.clone()).collect();
        let ids: Vec<String> = all_chunks.iter().map(|c| c.id.clone()).collect();
        bm25.fit(&docs, &ids);

        let chunk_count = store.count().await?;
        self.save_index_meta(&fingerprints, chunk_count)?;

        let files: HashSet<&str> = all_chunks.iter().map(|c| c.file_path.as_str()).collect();
        let report = IndexReport {
            skills: fingerprints.len(),
            files: files.len(),
            chunks: all_chunks.len(),
            fingerprints: fingerprints.len(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            errors,
        };

        // Swap the complete snapshot in only after every store write landed.
        *self.state.write() = Arc::new(IndexState {
            bm25,
            fingerprints,
            indexed: true,
        });

        info!(
            "indexed {} skills, {} chunks in {}ms",
            report.skills, report.chunks, report.duration_ms
        );
        Ok(report)
    }

    /// Search the indexed corpus
    ///
    /// Runs the full pipeline; auto-indexes once when no index exists.
    /// `top_k` defaults to the configured value.
    ///
    /// # Errors
    ///
    /// Embedding failures and store read failures are fatal. Cache and
    /// reranker failures are not: they degrade to the uncached / unranked
    /// path.
    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<SearchResponse> {
        let started = Instant::now();
        let top_k = top_k.unwrap_or(self.config.top_k);

        let Some(store) = self.store.clone() else {
            warn!("vector store unavailable; returning empty results");
            return Ok(Self::empty_response(query, &started));
        };

        self.ensure_indexed(&store).await?;

        // S1: cache lookup, exact then semantic; failures fall through
        let mut raw_query_embedding: Option<Vec<f32>> = None;
        if self.config.cache_enabled {
            if let Some(mut cached) = self.cache.get_exact(query) {
                cached.from_cache = true;
                return Ok(cached);
            }
            if !self.cache.is_empty() {
                match self.embedder.embed_query(query).await {
                    Ok(embedding) => {
                        if let Some(mut cached) = self
                            .cache
                            .get_semantic(&embedding, self.config.cache_similarity)
                        {
                            cached.from_cache = true;
                            return Ok(cached);
                        }
                        raw_query_embedding = Some(embedding);
                    }
                    Err(e) => debug!("semantic cache lookup skipped: {e}"),
                }
            }
        }

        // S2: concept expansion
        let expanded = self.graph.expand(query);
        let search_query = if expanded.is_empty() {
            query.to_string()
        } else {
            format!("{query} {}", expanded.join(" "))
        };
        debug!("expanded query: {search_query:?}");

        // S3: skill fingerprinting
        let query_embedding = self
            .embedder
            .embed_query(&search_query)
            .await
            .map_err(|e| EngineError::Embedding(e.to_string()))?;
        let state = self.state.read().clone();
        let matched_skills = match_skills(&state.fingerprints, &query_embedding);

        // S4: hybrid retrieval
        let candidates = if self.config.reranker_enabled {
            self.config.reranker_candidates
        } else {
            top_k * 2
        };
        let filter = if matched_skills.is_empty() {
            None
        } else {
            Some(MetadataFilter::In(
                "skill".to_string(),
                matched_skills.iter().map(|s| json!(s)).collect(),
            ))
        };
        let semantic: Vec<(String, usize)> = store
            .query(&query_embedding, candidates, filter.as_ref())
            .await?
            .into_iter()
            .enumerate()
            .map(|(rank, m)| (m.id, rank))
            .collect();
        let lexical = state.bm25.score(&search_query, candidates);
        debug!(
            "hybrid retrieval: {} semantic, {} lexical candidates",
            semantic.len(),
            lexical.len()
        );

        // S5: reciprocal rank fusion + payload fetch
        let mut fused = Self::rrf_fuse(&store, &semantic, &lexical).await?;

        // S6: optional cross-encoder reranking
        if self.config.reranker_enabled && !fused.is_empty() {
            if let Some(reranker) = &self.reranker {
                self.rerank(reranker, query, &mut fused).await;
            }
        }

        // S7: truncate and assemble
        fused.truncate(top_k);
        let skills_used: Vec<String> = fused
            .iter()
            .map(|r| r.chunk.skill.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let response = SearchResponse {
            query: query.to_string(),
            results: fused,
            skills_used,
            time_ms: started.elapsed().as_secs_f64() * 1000.0,
            from_cache: false,
            expanded_terms: (!expanded.is_empty()).then_some(expanded),
        };

        if self.config.cache_enabled {
            self.cache_response(query, raw_query_embedding, &search_query, &query_embedding, &response)
                .await;
        }

        Ok(response)
    }

    /// Run `search` and serialise the results into a markdown context block
    ///
    /// # Errors
    ///
    /// Propagates `search` failures.
    pub async fn get_context(&self, query: &str, max_tokens: usize) -> Result<String> {
        Ok(self.search(query, None).await?.to_context(max_tokens))
    }

    /// Index statistics for external status surfaces
    pub async fn status(&self) -> EngineStatus {
        let total_chunks = match &self.store {
            Some(store) => store.count().await.unwrap_or(0),
            None => 0,
        };
        let state = self.state.read().clone();
        EngineStatus {
            indexed: state.indexed && total_chunks > 0,
            total_chunks,
            bm25_docs: state.bm25.len(),
            skills: state
                .fingerprints
                .values()
                .map(|fp| {
                    (
                        fp.name.clone(),
                        SkillStatus {
                            chunks: fp.chunk_count,
                            domains: fp.domains.clone(),
                            description: fp.description.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Drop all indexed data: store records, in-memory state, cache, meta
    ///
    /// # Errors
    ///
    /// Returns a store error if the wipe fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.index_lock.lock().await;
        if let Some(store) = &self.store {
            store.delete(None).await?;
        }
        *self.state.write() = Arc::new(IndexState::default());
        self.cache.clear();
        let meta = self.config.index_meta_path();
        if meta.exists() {
            std::fs::remove_file(&meta)?;
        }
        info!("index cleared");
        Ok(())
    }

    /// Expand a query through the concept graph (explain surface)
    #[must_use]
    pub fn expand_query(&self, query: &str) -> Vec<String> {
        self.graph.expand(query)
    }

    /// Prune skills by fingerprint similarity (explain surface)
    #[must_use]
    pub fn match_skills(&self, query_embedding: &[f32]) -> Vec<String> {
        match_skills(&self.state.read().fingerprints, query_embedding)
    }

    /// The engine's configuration
    #[must_use]
    pub const fn config(&self) -> &MaestroConfig {
        &self.config
    }

    // ── Private ──────────────────────────────────────────────────────────

    /// Auto-index on first search; rebuild BM25 from the store on restart
    async fn ensure_indexed(&self, store: &Arc<dyn VectorStore>) -> Result<()> {
        let count = store.count().await.unwrap_or(0);
        if self.state.read().indexed && count > 0 {
            return Ok(());
        }

        if count > 0 && self.config.index_meta_path().exists() {
            let _guard = self.index_lock.lock().await;
            if self.state.read().indexed {
                return Ok(());
            }
            let documents = store.get(None).await?;
            let docs: Vec<String> = documents.iter().map(|d| d.document.clone()).collect();
            let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
            let mut bm25 = Bm25Index::new();
            bm25.fit(&docs, &ids);
            info!("rebuilt BM25 over {} stored chunks after restart", ids.len());
            *self.state.write() = Arc::new(IndexState {
                bm25,
                fingerprints: HashMap::new(),
                indexed: true,
            });
            return Ok(());
        }

        debug!("no index present; auto-indexing");
        self.index(None, false).await?;
        Ok(())
    }

    /// Embed chunks in document mode and upsert them in batches
    async fn store_chunks(&self, store: &Arc<dyn VectorStore>, chunks: &[Chunk]) -> Result<()> {
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.contextual_text.clone()).collect();
            let embeddings = self
                .embedder
                .embed_documents(&texts)
                .await
                .map_err(|e| EngineError::Embedding(e.to_string()))?;

            let mut records = Vec::with_capacity(batch.len());
            for (chunk, embedding) in batch.iter().zip(embeddings) {
                records.push(VectorRecord {
                    id: chunk.id.clone(),
                    embedding,
                    document: chunk.text.clone(),
                    metadata: Self::chunk_metadata(chunk)?,
                });
            }
            store.upsert(records).await?;
        }
        Ok(())
    }

    fn chunk_metadata(chunk: &Chunk) -> Result<HashMap<String, Value>> {
        Ok(HashMap::from([
            ("skill".to_string(), json!(chunk.skill)),
            ("file".to_string(), json!(chunk.file)),
            ("file_path".to_string(), json!(chunk.file_path)),
            ("section".to_string(), json!(chunk.section)),
            (
                "domains".to_string(),
                Value::String(serde_json::to_string(&chunk.domains)?),
            ),
        ]))
    }

    /// Embed every fingerprint's text in document mode
    async fn embed_fingerprints(
        &self,
        fingerprints: &mut HashMap<String, SkillFingerprint>,
    ) -> Result<()> {
        if fingerprints.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = fingerprints.keys().cloned().collect();
        let texts: Vec<String> = names
            .iter()
            .map(|n| fingerprints[n].fingerprint_text())
            .collect();
        let embeddings = self
            .embedder
            .embed_documents(&texts)
            .await
            .map_err(|e| EngineError::Embedding(e.to_string()))?;
        for (name, embedding) in names.into_iter().zip(embeddings) {
            if let Some(fp) = fingerprints.get_mut(&name) {
                fp.embedding = Some(embedding);
            }
        }
        Ok(())
    }

    /// Fuse the semantic and lexical lists with reciprocal rank fusion
    ///
    /// Each list contributes `1 / (k + rank + 1)` per chunk id (zero-based
    /// rank, k = 60). Full payloads are fetched from the store; ids missing
    /// there (a race with re-indexing) are skipped.
    async fn rrf_fuse(
        store: &Arc<dyn VectorStore>,
        semantic: &[(String, usize)],
        lexical: &[(String, f32)],
    ) -> Result<Vec<SearchResult>> {
        let mut order: Vec<String> = Vec::new();
        let mut rrf: HashMap<String, f32> = HashMap::new();
        let mut semantic_ranks: HashMap<&str, usize> = HashMap::new();
        let mut bm25_ranks: HashMap<&str, usize> = HashMap::new();

        for (id, rank) in semantic {
            accumulate_rrf(&mut order, &mut rrf, id, *rank);
            semantic_ranks.insert(id.as_str(), *rank);
        }
        for (rank, (id, _score)) in lexical.iter().enumerate() {
            accumulate_rrf(&mut order, &mut rrf, id, rank);
            bm25_ranks.insert(id.as_str(), rank);
        }

        if order.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = store.get(Some(&order)).await?;
        let by_id: HashMap<&str, &StoredDocument> =
            fetched.iter().map(|d| (d.id.as_str(), d)).collect();

        let mut results: Vec<SearchResult> = order
            .iter()
            .filter_map(|id| {
                let doc = by_id.get(id.as_str())?;
                Some(SearchResult {
                    chunk: Self::chunk_from_document(doc),
                    final_score: rrf[id],
                    semantic_rank: semantic_ranks.get(id.as_str()).copied(),
                    bm25_rank: bm25_ranks.get(id.as_str()).copied(),
                    rerank_score: None,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(results)
    }

    /// Rebuild a chunk from its stored payload
    fn chunk_from_document(doc: &StoredDocument) -> Chunk {
        let text_of = |key: &str, default: &str| {
            doc.metadata
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        let domains: Vec<String> = doc
            .metadata
            .get("domains")
            .and_then(Value::as_str)
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();

        Chunk {
            id: doc.id.clone(),
            text: doc.document.clone(),
            contextual_text: doc.document.clone(),
            skill: text_of("skill", "unknown"),
            file: text_of("file", ""),
            file_path: text_of("file_path", ""),
            section: text_of("section", ""),
            domains,
        }
    }

    /// Score the fused set with the cross-encoder and re-sort on success
    async fn rerank(&self, reranker: &Arc<dyn Reranker>, query: &str, fused: &mut [SearchResult]) {
        let pairs: Vec<(String, String)> = fused
            .iter()
            .map(|r| (query.to_string(), r.chunk.text.clone()))
            .collect();
        match reranker.predict(&pairs).await {
            Ok(scores) if scores.len() == fused.len() => {
                for (result, score) in fused.iter_mut().zip(scores) {
                    result.rerank_score = Some(score);
                    result.final_score = score;
                }
                fused.sort_by(|a, b| {
                    b.final_score
                        .partial_cmp(&a.final_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            Ok(_) => warn!("reranker returned a mismatched score count; keeping fusion order"),
            Err(e) => warn!("reranker failed ({e}); keeping fusion order"),
        }
    }

    /// Store a fresh response in the cache under the literal query
    ///
    /// The cached entry needs the raw query's embedding for semantic
    /// lookups. The embedding from the expanded query is reused when no
    /// expansion happened; otherwise one extra embed runs, and its failure
    /// only skips caching.
    async fn cache_response(
        &self,
        query: &str,
        raw_query_embedding: Option<Vec<f32>>,
        search_query: &str,
        query_embedding: &[f32],
        response: &SearchResponse,
    ) {
        let embedding = match raw_query_embedding {
            Some(embedding) => embedding,
            None if search_query == query => query_embedding.to_vec(),
            None => match self.embedder.embed_query(query).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    debug!("skipping cache store: {e}");
                    return;
                }
            },
        };
        self.cache.insert(query, embedding, response.clone());
    }

    fn empty_response(query: &str, started: &Instant) -> SearchResponse {
        SearchResponse {
            query: query.to_string(),
            results: Vec::new(),
            skills_used: Vec::new(),
            time_ms: started.elapsed().as_secs_f64() * 1000.0,
            from_cache: false,
            expanded_terms: None,
        }
    }

    /// Persist the index-meta document next to the store directory
    fn save_index_meta(
        &self,
        fingerprints: &HashMap<String, SkillFingerprint>,
        chunk_count: usize,
    ) -> Result<()> {
        let meta_path = self.config.index_meta_path();
        if let Some(parent) = meta_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut skills: Vec<&String> = fingerprints.keys().collect();
        skills.sort();
        let meta = json!({ "skills": skills, "chunk_count": chunk_count });
        std::fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?)?;
        Ok(())
    }
}
