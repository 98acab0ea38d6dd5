//! Google Generative Language API (v1beta) client for embeddings and text generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::ports::{ChatModel, EmbeddingGenerator};

/// Authenticated HTTP client shared by the embedder and the chat model.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/v1beta/{path}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.trim())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// `models/` prefixed resource name, accepting either `gemini-1.5-flash` or `models/gemini-1.5-flash`.
fn model_resource(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    batch_size: usize,
    max_retries: usize,
    retry_base: Duration,
}

impl GeminiEmbedder {
    pub fn new(client: GeminiClient, model: &str, batch_size: usize, max_retries: usize) -> Self {
        Self {
            client,
            model: model_resource(model),
            batch_size: batch_size.clamp(1, 100),
            max_retries: max_retries.max(1),
            retry_base: Duration::from_millis(500),
        }
    }

    #[must_use]
    pub const fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    async fn embed_batch(
        &self,
        texts: &[&str],
        task_type: TaskType,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &self.model,
                    content: Content::text(text),
                    task_type,
                })
                .collect(),
        };
        let path = format!("{}:batchEmbedContents", self.model);

        let mut attempt = 0usize;
        loop {
            match self
                .client
                .post::<_, BatchEmbedResponse>(&path, &request)
                .await
            {
                Ok(parsed) => {
                    if parsed.embeddings.len() != texts.len() {
                        return Err(ProviderError::CountMismatch {
                            expected: texts.len(),
                            got: parsed.embeddings.len(),
                        });
                    }
                    return Ok(parsed.embeddings.into_iter().map(|e| e.values).collect());
                }
                Err(err) if is_retryable(&err) && attempt + 1 < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff(attempt);
                    tracing::warn!(
                        attempt,
                        ?delay,
                        error = %err,
                        "Retrying embedding request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = u32::try_from(attempt.min(5)).unwrap_or(5);
        self.retry_base * (1 << capped)
    }
}

fn is_retryable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Api { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        ProviderError::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

#[async_trait]
impl EmbeddingGenerator for GeminiEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.embed_batch(&[text], TaskType::RetrievalQuery)
            .await?
            .pop()
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = batch_no, size = batch.len(), "Embedding chunk batch");
            vectors.extend(self.embed_batch(batch, TaskType::RetrievalDocument).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

pub struct GeminiChatModel {
    client: GeminiClient,
    model: String,
    temperature: f32,
}

impl GeminiChatModel {
    pub fn new(client: GeminiClient, model: &str, temperature: f32) -> Self {
        Self {
            client,
            model: model_resource(model),
            temperature,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                ..Content::text(prompt)
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };
        let path = format!("{}:generateContent", self.model);
        let parsed: GenerateResponse = self.client.post(&path, &request).await?;

        let text = parsed
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            role: None,
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
