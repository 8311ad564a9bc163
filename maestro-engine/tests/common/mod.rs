//! Shared fixtures for engine integration tests

use maestro_engine::prelude::*;
use maestro_rag::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Write a skill directory with an optional SKILL.md and content files
pub fn write_skill(root: &Path, name: &str, skill_md: Option<&str>, files: &[(&str, &str)]) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    if let Some(content) = skill_md {
        std::fs::write(dir.join("SKILL.md"), content).unwrap();
    }
    for (file_name, content) in files {
        std::fs::write(dir.join(file_name), content).unwrap();
    }
}

/// Engine config rooted in a temp directory
pub fn test_config(root: &Path) -> MaestroConfig {
    MaestroConfig {
        skill_paths: vec![root.join("skills")],
        vectordb_path: root.join("vectordb"),
        ..MaestroConfig::default()
    }
}

/// Engine over an in-memory store with deterministic local embeddings
pub fn test_engine(config: MaestroConfig) -> MaestroEngine {
    MaestroEngine::builder(config)
        .with_embedding_provider(Arc::new(LocalEmbedding::minilm()))
        .with_vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap()
}

/// Skills root inside the temp directory
pub fn skills_root(root: &Path) -> PathBuf {
    let dir = root.join("skills");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
