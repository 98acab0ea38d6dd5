use crate::domain::RetrievedChunk;
use crate::error::IndexError;

/// Nearest-neighbour lookup over embedded chunks. Built once, read-only afterwards.
pub trait VectorIndex: Send + Sync {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, IndexError>;
    fn len(&self) -> usize;
    fn dimension(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
