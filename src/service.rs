//! Process-level wiring of the pipeline components.
//!
//! Model handles and the index connection are expensive, so they are created
//! exactly once here and shared by every component. The service itself holds
//! no per-request state; distinct documents can be ingested, queried, and
//! analyzed fully in parallel.

use std::sync::Arc;

use crate::answer::summary::{SummaryOutcome, TenderSummarizer};
use crate::answer::{Answer, AnswerOrchestrator};
use crate::checklist::{Checklist, ChecklistSynthesizer};
use crate::config::RagConfig;
use crate::embeddings::EmbeddingProvider;
use crate::generation::GenerationProvider;
use crate::retrieval::Retriever;
use crate::segmenter::Segmenter;
use crate::stores::{Collection, SqliteChunkIndex};
use crate::types::RagError;

/// The assembled tender-analysis pipeline.
pub struct TenderService {
    segmenter: Segmenter,
    index: SqliteChunkIndex,
    synthesizer: ChecklistSynthesizer,
    orchestrator: AnswerOrchestrator,
    summarizer: TenderSummarizer,
}

impl TenderService {
    /// Opens the index and wires every component from `config` and the two
    /// injected capabilities.
    pub async fn connect(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Result<Self, RagError> {
        let index = SqliteChunkIndex::open(&config.index_path, embedder).await?;
        let retriever = Retriever::new(index.clone());

        Ok(Self {
            segmenter: Segmenter::default(),
            index,
            synthesizer: ChecklistSynthesizer::new(
                retriever.clone(),
                Arc::clone(&generator),
                config.generation_model.clone(),
            ),
            orchestrator: AnswerOrchestrator::new(
                retriever,
                Arc::clone(&generator),
                config.generation_model.clone(),
                config.light_model.clone(),
            ),
            summarizer: TenderSummarizer::new(generator, config.generation_model.clone()),
        })
    }

    /// Segments and indexes a tender document, returning the chunk count.
    pub async fn ingest(
        &self,
        document_id: &str,
        text: &str,
        pages: Option<&[String]>,
    ) -> Result<usize, RagError> {
        let chunks = self.segmenter.segment(document_id, text, pages)?;
        self.index
            .upsert(Collection::Tenders, document_id, &chunks)
            .await?;
        tracing::info!(document_id, chunks = chunks.len(), "ingested tender");
        Ok(chunks.len())
    }

    /// Segments and indexes a regulatory reference document.
    pub async fn ingest_reference(
        &self,
        document_id: &str,
        text: &str,
        pages: Option<&[String]>,
    ) -> Result<usize, RagError> {
        let chunks = self.segmenter.segment(document_id, text, pages)?;
        self.index
            .upsert(Collection::Reference, document_id, &chunks)
            .await?;
        Ok(chunks.len())
    }

    /// Drops every indexed chunk of a tender. Safe to call for unknown ids.
    pub async fn delete_document(&self, document_id: &str) -> Result<(), RagError> {
        self.index.delete(Collection::Tenders, document_id).await
    }

    /// Builds the submission checklist for an ingested tender.
    pub async fn checklist(
        &self,
        document_id: &str,
        full_text: &str,
    ) -> Result<Checklist, RagError> {
        self.synthesizer.synthesize(document_id, full_text).await
    }

    /// Answers a question about an ingested tender.
    pub async fn answer(
        &self,
        document_id: &str,
        question: &str,
        full_text: &str,
    ) -> Result<Answer, RagError> {
        self.orchestrator.answer(document_id, question, full_text).await
    }

    /// Extracts a structured fact sheet from the raw tender text.
    pub async fn summary(&self, full_text: &str) -> Result<SummaryOutcome, RagError> {
        self.summarizer.summarize(full_text).await
    }
}
