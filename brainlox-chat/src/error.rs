use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key for Google services not found, set GOOGLE_API_KEY in the environment or .env")]
    MissingApiKey,

    #[error("Initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ChatbotError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::MissingApiKey => 3,
            Self::Init(_) => 4,
            Self::Io(_) | Self::Serialization(_) | Self::Provider(_) => 10,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatbotError>;

/// Failure talking to an external collaborator (web page, embedding or chat API).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("upstream returned an empty response")]
    EmptyResponse,

    #[error("upstream returned {got} results for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("query vector has dimension {got}, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("{chunks} chunks but {vectors} vectors")]
    CountMismatch { chunks: usize, vectors: usize },

    #[error("cannot build an index from zero chunks")]
    Empty,
}

/// Pipeline build step, recorded alongside initialization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    Load,
    Split,
    Embed,
    Index,
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Split => "split",
            Self::Embed => "embed",
            Self::Index => "index",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone)]
#[error("{step} step failed: {message}")]
pub struct InitError {
    pub step: InitStep,
    pub message: String,
}

impl InitError {
    pub fn new(step: InitStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Failure while answering a question against a ready pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("query embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("vector retrieval failed: {0}")]
    Retrieval(#[source] IndexError),

    #[error("generation failed: {0}")]
    Generation(#[source] ProviderError),
}

impl PipelineError {
    /// Stable machine-readable code exposed to HTTP callers.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "embedding_failed",
            Self::Retrieval(_) => "retrieval_failed",
            Self::Generation(_) => "generation_failed",
        }
    }

    /// Caller-facing description; upstream detail stays in the logs.
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "the embedding service could not process the query",
            Self::Retrieval(_) => "relevant course content could not be retrieved",
            Self::Generation(_) => "the language model could not produce an answer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ChatbotError::MissingApiKey.exit_code(), 3);
        assert_eq!(
            ChatbotError::Init(InitError::new(InitStep::Embed, "boom")).exit_code(),
            4
        );
        assert_eq!(
            ChatbotError::from(ProviderError::EmptyResponse).exit_code(),
            10
        );
    }

    #[test]
    fn test_pipeline_error_hides_upstream_detail() {
        let err = PipelineError::Generation(ProviderError::Api {
            status: 500,
            body: "secret internal trace".to_string(),
        });
        assert_eq!(err.code(), "generation_failed");
        assert!(!err.public_message().contains("secret"));
    }

    #[test]
    fn test_init_error_display() {
        let err = InitError::new(InitStep::Load, "connection refused");
        assert_eq!(err.to_string(), "load step failed: connection refused");
    }
}
