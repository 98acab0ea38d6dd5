use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::FlatIndex;
use crate::domain::Document;
use crate::error::{InitError, InitStep};
use crate::ports::{CorpusLoader, EmbeddingGenerator, VectorIndex};
use crate::services::TextSplitter;

/// Runs corpus → chunks → embeddings → index, stopping at the first failing step.
pub struct IndexBuilder {
    loader: Arc<dyn CorpusLoader>,
    embedder: Arc<dyn EmbeddingGenerator>,
    splitter: TextSplitter,
}

impl IndexBuilder {
    pub fn new(
        loader: Arc<dyn CorpusLoader>,
        embedder: Arc<dyn EmbeddingGenerator>,
        splitter: TextSplitter,
    ) -> Self {
        Self {
            loader,
            embedder,
            splitter,
        }
    }

    pub async fn build(&self) -> Result<BuiltIndex, InitError> {
        let started = Instant::now();

        tracing::info!(source = self.loader.source_url(), "Fetching course data");
        let documents = self
            .loader
            .load()
            .await
            .map_err(|e| InitError::new(InitStep::Load, e.to_string()))?;
        tracing::info!(documents = documents.len(), "Data loaded from source");

        let chunks = self.splitter.split_documents(&documents);
        if chunks.is_empty() {
            return Err(InitError::new(
                InitStep::Split,
                "corpus produced no text chunks",
            ));
        }
        tracing::info!(chunks = chunks.len(), "Documents split into text chunks");

        let vectors = {
            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            self.embedder
                .embed_documents(&texts)
                .await
                .map_err(|e| InitError::new(InitStep::Embed, e.to_string()))?
        };

        let index = FlatIndex::build(chunks, vectors)
            .map_err(|e| InitError::new(InitStep::Index, e.to_string()))?;

        let stats = IndexStats {
            documents: documents.len(),
            corpus_hash: corpus_hash(&documents),
            chunks: index.len(),
            dimension: index.dimension(),
            embedding_model: self.embedder.model_name().to_string(),
            built_at: Utc::now(),
            build_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(
            chunks = stats.chunks,
            dimension = stats.dimension,
            build_ms = stats.build_ms,
            "Embeddings created and stored in vector index"
        );

        Ok(BuiltIndex {
            index: Arc::new(index),
            stats,
        })
    }
}

/// Digest over every document's content hash, in load order.
fn corpus_hash(documents: &[Document]) -> String {
    let mut hasher = blake3::Hasher::new();
    for doc in documents {
        hasher.update(doc.content_hash.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

pub struct BuiltIndex {
    pub index: Arc<dyn VectorIndex>,
    pub stats: IndexStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    /// Changes whenever the fetched course text changes.
    pub corpus_hash: String,
    pub chunks: usize,
    pub dimension: usize,
    pub embedding_model: String,
    pub built_at: DateTime<Utc>,
    pub build_ms: u64,
}
