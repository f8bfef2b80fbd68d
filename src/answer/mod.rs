//! Answers questions about a tender with retrieval-augmented generation.
//!
//! Questions are first classified by complexity. Definitional questions
//! ("what is X", "qué significa X") go to the lightweight model with no
//! retrieved context; everything else goes to the heavy model with context
//! assembled from the tender partition and the regulatory reference corpus.
//! Exactly one generation call is made per request, and its latency and token
//! usage are recorded on the returned [`Answer`].

pub mod summary;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationProvider;
use crate::retrieval::Retriever;
use crate::types::RagError;

/// Document-scoped chunks assembled into complex-question context.
const DOCUMENT_CONTEXT_HITS: usize = 3;
/// Reference-corpus chunks assembled into complex-question context.
const REFERENCE_CONTEXT_HITS: usize = 2;
/// Per-chunk character cap inside the assembled context.
const CONTEXT_CHUNK_CHARS: usize = 1000;
/// Raw-text fallback size when retrieval comes back empty.
const RAW_TEXT_FALLBACK_CHARS: usize = 3000;

/// Phrases signaling a definitional question that needs no document context.
const DEFINITIONAL_MARKERS: &[&str] = &[
    "what is",
    "what's",
    "what does",
    "meaning",
    "explain",
    "define",
    "definition",
    "qué es",
    "que es",
    "qué significa",
    "que significa",
    "significa",
    "explica",
    "definición",
    "definicion",
];

/// A completed answer with usage and latency metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
    /// Identifier of the model that produced the answer.
    pub model: String,
}

/// Complexity class of an incoming question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionComplexity {
    /// Definitional; answerable without document context.
    Simple,
    /// Needs retrieved context from the document and the reference corpus.
    Complex,
}

/// Classifies a question by membership against the definitional phrase set.
pub fn classify_question(question: &str) -> QuestionComplexity {
    let folded = question.to_lowercase();
    if DEFINITIONAL_MARKERS
        .iter()
        .any(|marker| folded.contains(marker))
    {
        QuestionComplexity::Simple
    } else {
        QuestionComplexity::Complex
    }
}

/// Routes questions to the right model with the right context.
pub struct AnswerOrchestrator {
    retriever: Retriever,
    generator: Arc<dyn GenerationProvider>,
    heavy_model: String,
    light_model: String,
}

impl AnswerOrchestrator {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn GenerationProvider>,
        heavy_model: impl Into<String>,
        light_model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            generator,
            heavy_model: heavy_model.into(),
            light_model: light_model.into(),
        }
    }

    /// Answers `question` about `document_id`.
    ///
    /// `full_text` is the raw document text, used as a last-resort context
    /// when retrieval returns nothing. Failures are fatal to this request
    /// only; no retry is performed here.
    pub async fn answer(
        &self,
        document_id: &str,
        question: &str,
        full_text: &str,
    ) -> Result<Answer, RagError> {
        let complexity = classify_question(question);
        let (model, context) = match complexity {
            QuestionComplexity::Simple => (self.light_model.as_str(), String::new()),
            QuestionComplexity::Complex => (
                self.heavy_model.as_str(),
                self.assemble_context(document_id, question, full_text)
                    .await?,
            ),
        };

        tracing::debug!(document_id, ?complexity, model, "answering question");

        let prompt = build_prompt(question, &context);
        let started = Instant::now();
        let generated = self.generator.generate(model, &prompt).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        Ok(Answer {
            text: generated.text,
            prompt_tokens: generated.prompt_tokens,
            completion_tokens: generated.completion_tokens,
            latency_ms,
            model: model.to_string(),
        })
    }

    /// Gathers tender and regulatory chunks; falls back to the head of the
    /// raw text when both retrievals come back empty.
    async fn assemble_context(
        &self,
        document_id: &str,
        question: &str,
        full_text: &str,
    ) -> Result<String, RagError> {
        let (document_hits, reference_hits) = tokio::join!(
            self.retriever
                .search_document(document_id, question, DOCUMENT_CONTEXT_HITS),
            self.retriever.search_reference(question, REFERENCE_CONTEXT_HITS),
        );
        let document_hits = document_hits?;
        let reference_hits = reference_hits?;

        if document_hits.is_empty() && reference_hits.is_empty() {
            return Ok(full_text.chars().take(RAW_TEXT_FALLBACK_CHARS).collect());
        }

        let mut sections = Vec::with_capacity(document_hits.len() + reference_hits.len());
        for hit in &document_hits {
            sections.push(format!(
                "[Página {}, Sección: {}]\n{}",
                hit.page,
                hit.section,
                cap_chars(&hit.text, CONTEXT_CHUNK_CHARS)
            ));
        }
        for hit in &reference_hits {
            sections.push(format!(
                "[Normativa]\n{}",
                cap_chars(&hit.text, CONTEXT_CHUNK_CHARS)
            ));
        }
        Ok(sections.join("\n\n"))
    }
}

fn cap_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn build_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "Eres un experto en contratación estatal colombiana.\n\
             Responde de forma clara y breve la siguiente pregunta.\n\n\
             PREGUNTA DEL USUARIO:\n{question}"
        )
    } else {
        format!(
            "Eres un experto en contratación estatal colombiana.\n\
             Analiza el siguiente contexto del pliego de condiciones y responde la pregunta del usuario.\n\n\
             CONTEXTO:\n{context}\n\n\
             PREGUNTA DEL USUARIO:\n{question}\n\n\
             Responde de forma clara y concisa, citando las partes relevantes del pliego cuando sea posible."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitional_questions_are_simple() {
        assert_eq!(
            classify_question("What is a bid-seriousness guarantee?"),
            QuestionComplexity::Simple
        );
        assert_eq!(
            classify_question("¿Qué significa garantía de seriedad?"),
            QuestionComplexity::Simple
        );
        assert_eq!(
            classify_question("Explain the RUT requirement"),
            QuestionComplexity::Simple
        );
    }

    #[test]
    fn document_specific_questions_are_complex() {
        assert_eq!(
            classify_question("What experience requirements are demanded in this process?"),
            QuestionComplexity::Complex
        );
        assert_eq!(
            classify_question("¿Cuál es el presupuesto oficial del proceso?"),
            QuestionComplexity::Complex
        );
    }

    #[test]
    fn prompts_only_carry_a_context_block_when_context_exists() {
        let bare = build_prompt("¿Cuál es el plazo?", "");
        assert!(!bare.contains("CONTEXTO:"));
        let contextual = build_prompt("¿Cuál es el plazo?", "[Página 1] texto");
        assert!(contextual.contains("CONTEXTO:"));
        assert!(contextual.contains("[Página 1] texto"));
    }

    #[test]
    fn chunk_capping_is_char_safe() {
        let text = "ñ".repeat(1200);
        assert_eq!(cap_chars(&text, 1000).chars().count(), 1000);
    }
}
