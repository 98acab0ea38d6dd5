use serde::{Deserialize, Serialize};

use super::Chunk;

/// One prior exchange supplied by the caller. History is never stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A chunk returned by the retriever, with its distance to the query vector.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub answer: String,
    pub source_chunks: Vec<RetrievedChunk>,
}

impl ChatAnswer {
    /// Source URLs in retrieval order, with a placeholder for chunks lacking one.
    pub fn sources(&self) -> Vec<String> {
        self.source_chunks
            .iter()
            .map(|r| r.chunk.source_label().to_string())
            .collect()
    }
}
