use async_trait::async_trait;

use crate::error::ProviderError;

#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError>;
    fn model_name(&self) -> &str;
}
