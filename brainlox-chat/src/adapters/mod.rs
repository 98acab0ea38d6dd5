//! Concrete implementations of the ports: the BrainLox web page, the Gemini
//! API and an in-memory vector index.

pub mod flat_index;
pub mod gemini;
pub mod web;

pub use flat_index::FlatIndex;
pub use gemini::{GeminiChatModel, GeminiClient, GeminiEmbedder};
pub use web::WebCorpusLoader;
