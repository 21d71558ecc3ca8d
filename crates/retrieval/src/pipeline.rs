//! End-to-end query pipeline.
//!
//! One request carries a document URL and a list of questions. The pipeline
//! loads and chunks the document, embeds the chunks, populates a fresh
//! request-scoped index, then answers each question by retrieval plus
//! synthesis. The answer list always lines up 1:1 with the question list:
//! per-question model failures degrade to placeholder answers inside the
//! synthesizer, while document-level failures (fetch, parse, embedding,
//! index) fail the whole request.

use crate::chunker::chunk_text;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index::{create_backend, IndexBackend};
use crate::loader::DocumentLoader;
use crate::synthesize::{AnswerSynthesizer, NO_CONTEXT_ANSWER};
use docquery_core::config::{AppConfig, ChunkingConfig};
use docquery_core::AppResult;
use docquery_llm::create_client;
use std::sync::Arc;

/// Orchestrates one document-question-answering request end to end.
pub struct QueryPipeline {
    loader: DocumentLoader,
    embedder: Arc<dyn EmbeddingProvider>,
    index_backend: Arc<dyn IndexBackend>,
    synthesizer: AnswerSynthesizer,
    chunking: ChunkingConfig,
    batch_size: usize,
    top_k: usize,
}

impl std::fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("chunking", &self.chunking)
            .field("batch_size", &self.batch_size)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl QueryPipeline {
    /// Assemble a pipeline from explicit parts.
    pub fn new(
        loader: DocumentLoader,
        embedder: Arc<dyn EmbeddingProvider>,
        index_backend: Arc<dyn IndexBackend>,
        synthesizer: AnswerSynthesizer,
        chunking: ChunkingConfig,
        batch_size: usize,
        top_k: usize,
    ) -> Self {
        Self {
            loader,
            embedder,
            index_backend,
            synthesizer,
            chunking,
            batch_size,
            top_k,
        }
    }

    /// Assemble a pipeline from configuration.
    ///
    /// All backends are chosen here, once; the request path only sees trait
    /// objects. Logging is initialized with the configured level (a no-op if
    /// a subscriber is already installed).
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        docquery_core::logging::init_logging(config.log_level.as_deref())?;

        let loader = DocumentLoader::new()?;
        let embedder = create_provider(&config.embedding)?;
        let index_backend = create_backend(&config.index)?;

        let api_key = config.llm_api_key();
        let client = create_client(
            "openai",
            Some(&config.synthesis.endpoint),
            api_key.as_deref(),
        )?;
        let synthesizer = AnswerSynthesizer::new(client, config.synthesis.clone());

        Ok(Self {
            loader,
            embedder,
            index_backend,
            synthesizer,
            chunking: config.chunking.clone(),
            batch_size: config.embedding.batch_size,
            top_k: config.synthesis.max_context_chunks,
        })
    }

    /// Answer `questions` about the document at `url`.
    ///
    /// Returns exactly one answer per question, in question order.
    pub async fn run(&self, url: &str, questions: &[String]) -> AppResult<Vec<String>> {
        let text = self.loader.load(url).await?;
        self.answer_from_text(&text, url, questions).await
    }

    /// Answer `questions` about already-extracted document text.
    ///
    /// `source` labels the chunks (normally the document URL). A document
    /// with no extractable words yields the no-context sentinel for every
    /// question without touching the embedder, the index, or the model.
    pub async fn answer_from_text(
        &self,
        text: &str,
        source: &str,
        questions: &[String],
    ) -> AppResult<Vec<String>> {
        let chunks = chunk_text(
            text,
            source,
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
        );

        if chunks.is_empty() {
            tracing::warn!(source, "Document has no extractable text");
            return Ok(vec![NO_CONTEXT_ANSWER.to_string(); questions.len()]);
        }

        tracing::info!(
            source,
            chunks = chunks.len(),
            questions = questions.len(),
            "Indexing document"
        );

        let chunk_texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let chunk_vectors = self.embed_batched(&chunk_texts).await?;

        let mut index = self.index_backend.open(self.embedder.dimensions()).await?;
        index.add(chunks, chunk_vectors).await?;

        let question_vectors = self.embed_batched(questions).await?;

        let mut answers = Vec::with_capacity(questions.len());
        for (question, vector) in questions.iter().zip(&question_vectors) {
            let context = index.search(vector, self.top_k).await?;
            tracing::debug!(question, retrieved = context.len(), "Retrieved context");
            answers.push(self.synthesizer.synthesize(question, &context).await);
        }

        Ok(answers)
    }

    /// Embed texts in batches of `batch_size`, preserving order.
    async fn embed_batched(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embedder.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = AppConfig::default();
        config.synthesis.api_key_env = "DOCQUERY_TEST_UNSET_KEY".to_string();
        std::env::remove_var("DOCQUERY_TEST_UNSET_KEY");

        let err = QueryPipeline::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_from_config_rejects_invalid_log_level() {
        let mut config = AppConfig::default();
        config.log_level = Some("foo=bar=baz".to_string());

        let err = QueryPipeline::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid log filter"));
    }

    #[test]
    fn test_from_config_validates_first() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;

        let err = QueryPipeline::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }
}
