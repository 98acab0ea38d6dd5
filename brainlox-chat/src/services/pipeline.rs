//! Owns the pipeline lifecycle: build once, publish an immutable snapshot,
//! answer from whatever snapshot is current.
//!
//! Readers never block on a build. Builds are single-flight: concurrent
//! callers of [`PipelineService::ensure_ready`] share one attempt and its
//! outcome. A failed rebuild leaves the previous snapshot in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::InitError;
use crate::ports::{ChatModel, EmbeddingGenerator};
use crate::services::{ConversationalRetriever, IndexBuilder, IndexStats};

/// Everything needed to answer questions, published atomically once built.
pub struct ReadySnapshot {
    pub retriever: ConversationalRetriever,
    pub stats: IndexStats,
}

pub struct PipelineService {
    builder: IndexBuilder,
    embedder: Arc<dyn EmbeddingGenerator>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
    snapshot: RwLock<Option<Arc<ReadySnapshot>>>,
    /// Held for the duration of a build; stores the last failure.
    gate: Mutex<Option<InitError>>,
    attempts: AtomicU64,
}

impl PipelineService {
    pub fn new(
        builder: IndexBuilder,
        embedder: Arc<dyn EmbeddingGenerator>,
        model: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        Self {
            builder,
            embedder,
            model,
            top_k,
            snapshot: RwLock::new(None),
            gate: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<Arc<ReadySnapshot>> {
        self.snapshot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Number of build attempts that have finished, successful or not.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Builds a fresh snapshot unconditionally and publishes it on success.
    pub async fn initialize(&self) -> Result<Arc<ReadySnapshot>, InitError> {
        let mut last_error = self.gate.lock().await;
        self.build_locked(&mut last_error).await
    }

    /// Returns the current snapshot, building one if none exists yet.
    ///
    /// Callers that arrive while a build is running wait for it and receive
    /// its result instead of starting another.
    pub async fn ensure_ready(&self) -> Result<Arc<ReadySnapshot>, InitError> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }

        let seen = self.attempts();
        let mut last_error = self.gate.lock().await;

        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        if self.attempts() != seen {
            if let Some(err) = last_error.as_ref() {
                return Err(err.clone());
            }
        }

        self.build_locked(&mut last_error).await
    }

    /// Rebuilds on a fixed interval. The first tick is skipped since startup
    /// already ran a build.
    pub fn spawn_refresh(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tracing::info!("Refreshing course index");
                if let Err(e) = self.initialize().await {
                    tracing::warn!(error = %e, "Refresh failed, keeping previous index");
                }
            }
        })
    }

    async fn build_locked(
        &self,
        last_error: &mut Option<InitError>,
    ) -> Result<Arc<ReadySnapshot>, InitError> {
        let outcome = self.builder.build().await;
        let result = match outcome {
            Ok(built) => {
                let retriever = ConversationalRetriever::new(
                    built.index,
                    self.embedder.clone(),
                    self.model.clone(),
                    self.top_k,
                );
                let snapshot = Arc::new(ReadySnapshot {
                    retriever,
                    stats: built.stats,
                });
                let previous = self.snapshot.write().replace(snapshot.clone());
                *last_error = None;
                let changed = previous
                    .is_none_or(|p| p.stats.corpus_hash != snapshot.stats.corpus_hash);
                tracing::info!(
                    chunks = snapshot.stats.chunks,
                    corpus_changed = changed,
                    "Chatbot initialization successful"
                );
                Ok(snapshot)
            }
            Err(err) => {
                tracing::error!(error = %err, "Chatbot initialization failed");
                *last_error = Some(err.clone());
                Err(err)
            }
        };
        self.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }
}
