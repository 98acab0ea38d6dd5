pub mod chat;
pub mod chunk;
pub mod document;
pub mod id;

pub use chat::{ChatAnswer, ChatTurn, RetrievedChunk};
pub use chunk::{Chunk, UNKNOWN_SOURCE};
pub use document::{Document, DocumentMetadata};
pub use id::DocId;
