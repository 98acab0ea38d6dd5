use async_trait::async_trait;

use crate::domain::Document;
use crate::error::ProviderError;

/// Fetches the raw corpus the index is built from.
#[async_trait]
pub trait CorpusLoader: Send + Sync {
    fn source_url(&self) -> &str;
    async fn load(&self) -> Result<Vec<Document>, ProviderError>;
}
