//! Conversational retrieval: condense history into a standalone question,
//! fetch the nearest chunks, answer from them.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::{ChatAnswer, ChatTurn, RetrievedChunk};
use crate::error::PipelineError;
use crate::ports::{ChatModel, EmbeddingGenerator, VectorIndex};

pub struct ConversationalRetriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingGenerator>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
}

impl ConversationalRetriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingGenerator>,
        model: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            model,
            top_k,
        }
    }

    pub async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<ChatAnswer, PipelineError> {
        let standalone = if history.is_empty() {
            question.to_string()
        } else {
            let rephrased = self
                .model
                .generate(&condense_prompt(question, history))
                .await
                .map_err(PipelineError::Generation)?;
            let rephrased = rephrased.trim();
            if rephrased.is_empty() {
                question.to_string()
            } else {
                tracing::debug!(standalone = rephrased, "Condensed follow-up question");
                rephrased.to_string()
            }
        };

        let query = self
            .embedder
            .embed_query(&standalone)
            .await
            .map_err(PipelineError::Embedding)?;
        let source_chunks = self
            .index
            .search(&query, self.top_k)
            .map_err(PipelineError::Retrieval)?;

        let answer = self
            .model
            .generate(&answer_prompt(&standalone, &source_chunks))
            .await
            .map_err(PipelineError::Generation)?;

        Ok(ChatAnswer {
            answer: answer.trim().to_string(),
            source_chunks,
        })
    }
}

pub(crate) fn condense_prompt(question: &str, history: &[ChatTurn]) -> String {
    let mut rendered = String::new();
    for turn in history {
        let _ = write!(
            rendered,
            "\nHuman: {}\nAssistant: {}",
            turn.question, turn.answer
        );
    }
    format!(
        "Given the following conversation and a follow up question, rephrase the follow up \
         question to be a standalone question, in its original language.\n\n\
         Chat History:\n{rendered}\nFollow Up Input: {question}\nStandalone question:"
    )
}

pub(crate) fn answer_prompt(question: &str, context: &[RetrievedChunk]) -> String {
    let context = context
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. If you don't \
         know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}
