use serde::{Deserialize, Serialize};

use super::DocId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub content: String,
    pub content_hash: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: String) -> Self {
        let content_hash = blake3::hash(content.as_bytes()).to_hex().to_string();

        Self {
            id: DocId::generate(),
            content,
            content_hash,
            metadata: DocumentMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.metadata.language = Some(language.into());
        self
    }
}

/// Provenance copied onto every chunk split from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
}
