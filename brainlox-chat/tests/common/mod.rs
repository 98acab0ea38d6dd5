#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use brainlox_chat::domain::Document;
use brainlox_chat::error::ProviderError;
use brainlox_chat::http::{AppState, router};
use brainlox_chat::ports::{ChatModel, CorpusLoader, EmbeddingGenerator};
use brainlox_chat::services::{IndexBuilder, PipelineService, TextSplitter};
use serde_json::Value;
use tower::ServiceExt;

pub const ANSWER: &str = "Scratch Junior is our block coding course for young learners.";

/// Serves a small fixed catalogue; fails the first `failures` calls.
pub struct FakeLoader {
    pub calls: AtomicUsize,
    failures: usize,
}

impl FakeLoader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusLoader for FakeLoader {
    fn source_url(&self) -> &str {
        "https://brainlox.com/courses/category/technical"
    }

    async fn load(&self) -> Result<Vec<Document>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(ProviderError::Api {
                status: 503,
                body: "origin unavailable".to_string(),
            });
        }
        Ok(vec![
            Document::new("Python course for kids aged 8 and up.".to_string())
                .with_source("https://brainlox.com/courses/python"),
            Document::new("Java course covering objects and classes.".to_string())
                .with_source("https://brainlox.com/courses/java"),
            Document::new("Scratch course for beginners, build games with blocks.".to_string()),
            Document::new("Our tutors are experienced engineers.".to_string())
                .with_source("https://brainlox.com/about"),
        ])
    }
}

/// One dimension per course keyword plus a constant bias.
pub struct KeywordEmbedder {
    pub fail_queries: bool,
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut vector: Vec<f32> = ["python", "java", "scratch"]
        .iter()
        .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
        .collect();
    vector.push(1.0);
    vector
}

#[async_trait]
impl EmbeddingGenerator for KeywordEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if self.fail_queries {
            return Err(ProviderError::Api {
                status: 500,
                body: "internal stack trace: quota project 4242".to_string(),
            });
        }
        Ok(keyword_vector(text))
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

pub struct CannedModel;

#[async_trait]
impl ChatModel for CannedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("  {ANSWER}\n"))
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

pub struct Harness {
    pub pipeline: Arc<PipelineService>,
    pub loader: Arc<FakeLoader>,
}

impl Harness {
    pub fn new(loader_failures: usize, fail_queries: bool) -> Self {
        let loader = Arc::new(FakeLoader {
            calls: AtomicUsize::new(0),
            failures: loader_failures,
        });
        let embedder: Arc<dyn EmbeddingGenerator> = Arc::new(KeywordEmbedder { fail_queries });
        let builder = IndexBuilder::new(
            loader.clone(),
            embedder.clone(),
            TextSplitter::new(900, 150).unwrap(),
        );
        let pipeline = Arc::new(PipelineService::new(
            builder,
            embedder,
            Arc::new(CannedModel),
            3,
        ));
        Self { pipeline, loader }
    }

    pub async fn ready(loader_failures: usize, fail_queries: bool) -> Self {
        let harness = Self::new(loader_failures, fail_queries);
        harness.pipeline.initialize().await.unwrap();
        harness
    }

    pub async fn chat(&self, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn health(&self) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let app = router(AppState {
            pipeline: self.pipeline.clone(),
        });
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
