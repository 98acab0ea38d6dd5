pub mod indexing;
pub mod pipeline;
pub mod retriever;
pub mod splitter;

pub use indexing::{BuiltIndex, IndexBuilder, IndexStats};
pub use pipeline::{PipelineService, ReadySnapshot};
pub use retriever::ConversationalRetriever;
pub use splitter::TextSplitter;
