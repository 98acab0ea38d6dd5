pub mod embed;
pub mod fetch;
pub mod generate;
pub mod index;

pub use embed::EmbeddingGenerator;
pub use fetch::CorpusLoader;
pub use generate::ChatModel;
pub use index::VectorIndex;
