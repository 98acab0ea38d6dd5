use serde::{Deserialize, Serialize};

use super::{DocId, DocumentMetadata};

pub const UNKNOWN_SOURCE: &str = "Unknown Source";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: DocId,
    /// Position of the chunk within its document.
    pub index: usize,
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Chunk {
    pub fn new(doc_id: DocId, index: usize, text: String) -> Self {
        Self {
            doc_id,
            index,
            text,
            metadata: DocumentMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn source_label(&self) -> &str {
        self.metadata.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}
