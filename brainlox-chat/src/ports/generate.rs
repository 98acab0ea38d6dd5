use async_trait::async_trait;

use crate::error::ProviderError;

/// Hosted language model that completes a single prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
    fn model_name(&self) -> &str;
}
