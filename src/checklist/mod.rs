//! Builds the checklist of required submission documents for a tender.
//!
//! The checklist merges two sources: a fixed baseline that applies to every
//! tender, and document-specific items discovered by prompting the generation
//! model over retrieved chunks. Every item carries references resolving where
//! the document mentions it. Detection is best-effort: when the model call
//! or its output fails, the failure is recorded as a warning on the result
//! and the baseline is returned in full.

pub mod baseline;

use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::generation::{GenerationProvider, JsonExtraction, extract_json_object};
use crate::retrieval::{RetrievedChunk, Retriever};
use crate::types::RagError;

use baseline::BASELINE_ITEMS;

/// Maximum grapheme length of a reference excerpt.
const EXCERPT_GRAPHEMES: usize = 200;
/// Hits fetched per reference-resolution query.
const REFERENCE_HITS: usize = 3;
/// Chunks fed to the detection prompt.
const DETECTION_CONTEXT_CHUNKS: usize = 8;
/// Raw-text fallback size when no chunks could be retrieved.
const RAW_TEXT_FALLBACK_CHARS: usize = 3000;

/// Where a checklist item is mentioned in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub page: u32,
    pub section: String,
    /// Verbatim excerpt of the mentioning chunk, capped at 200 graphemes.
    pub excerpt: String,
}

/// A required submission document, baseline or detected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub always_required: bool,
    pub references: Vec<Reference>,
}

/// Full checklist for one tender document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checklist {
    pub base_items: Vec<ChecklistItem>,
    pub specific_items: Vec<ChecklistItem>,
    pub total: usize,
    /// Non-fatal detection failure, when one occurred.
    pub warning: Option<String>,
}

#[derive(Deserialize, Default)]
struct DetectionPayload {
    #[serde(default)]
    documentos: Vec<DetectedDocument>,
}

/// Item shape the detection prompt asks the model for.
#[derive(Deserialize, Default)]
struct DetectedDocument {
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    descripcion: String,
    #[serde(default = "default_category")]
    categoria: String,
}

fn default_category() -> String {
    "otros".to_string()
}

/// Synthesizes checklists from the baseline list plus model detection.
pub struct ChecklistSynthesizer {
    retriever: Retriever,
    generator: Arc<dyn GenerationProvider>,
    model: String,
}

impl ChecklistSynthesizer {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn GenerationProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            generator,
            model: model.into(),
        }
    }

    /// Produces the checklist for `document_id`.
    ///
    /// Baseline reference resolution and the detection call run concurrently;
    /// a detection failure of any kind degrades to a warning on the result.
    pub async fn synthesize(
        &self,
        document_id: &str,
        full_text: &str,
    ) -> Result<Checklist, RagError> {
        let (base_items, detection) = tokio::join!(
            self.resolve_baseline(document_id),
            self.detect_specific(document_id, full_text),
        );

        let mut warning = None;
        let specific_items = match detection {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(document_id, error = %err, "specific-document detection failed");
                warning = Some(format!(
                    "no se pudieron detectar documentos específicos: {err}"
                ));
                Vec::new()
            }
        };

        let total = base_items.len() + specific_items.len();
        Ok(Checklist {
            base_items,
            specific_items,
            total,
            warning,
        })
    }

    async fn resolve_baseline(&self, document_id: &str) -> Vec<ChecklistItem> {
        let resolutions = BASELINE_ITEMS.iter().map(|item| async move {
            let references = self
                .resolve_references(document_id, item.name, item.description)
                .await;
            ChecklistItem {
                name: item.name.to_string(),
                description: item.description.to_string(),
                category: item.category.to_string(),
                always_required: true,
                references,
            }
        });
        join_all(resolutions).await
    }

    /// Looks up where a document is mentioned: top hits for
    /// `"{name} {description}"`, deduplicated by (page, section).
    ///
    /// Resolution failures leave the item without references instead of
    /// failing the checklist.
    async fn resolve_references(
        &self,
        document_id: &str,
        name: &str,
        description: &str,
    ) -> Vec<Reference> {
        let query = format!("{name} {description}");
        let hits = match self
            .retriever
            .search_document(document_id, &query, REFERENCE_HITS)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!(document_id, name, error = %err, "reference lookup failed");
                return Vec::new();
            }
        };

        let mut references: Vec<Reference> = Vec::new();
        for hit in hits {
            if references
                .iter()
                .any(|existing| existing.page == hit.page && existing.section == hit.section)
            {
                continue;
            }
            references.push(Reference {
                page: hit.page,
                section: hit.section,
                excerpt: excerpt_of(&hit.text),
            });
        }
        references
    }

    async fn detect_specific(
        &self,
        document_id: &str,
        full_text: &str,
    ) -> Result<Vec<ChecklistItem>, RagError> {
        let (requirements, experience, technical) = tokio::join!(
            self.retriever
                .search_document(document_id, "requisitos documentos habilitantes", 5),
            self.retriever
                .search_document(document_id, "experiencia certificaciones", 3),
            self.retriever
                .search_document(document_id, "especificaciones técnicas documentos", 3),
        );

        let mut context_chunks: Vec<RetrievedChunk> = requirements?;
        context_chunks.extend(experience?);
        context_chunks.extend(technical?);
        context_chunks.truncate(DETECTION_CONTEXT_CHUNKS);

        // A tender with no indexed chunks still gets a detection pass over
        // the head of the raw text.
        let context = if context_chunks.is_empty() {
            full_text.chars().take(RAW_TEXT_FALLBACK_CHARS).collect()
        } else {
            annotate_chunks(&context_chunks)
        };
        let prompt = detection_prompt(&context);
        let generated = self.generator.generate(&self.model, &prompt).await?;

        let payload = match extract_json_object(&generated.text) {
            JsonExtraction::Parsed(value) => serde_json::from_value::<DetectionPayload>(value)
                .map_err(|err| RagError::Parse(err.to_string()))?,
            JsonExtraction::Malformed(_) => {
                return Err(RagError::Parse(
                    "detection response contained no JSON object".into(),
                ));
            }
        };

        let resolutions = payload.documentos.into_iter().map(|detected| async move {
            let references = self
                .resolve_references(document_id, &detected.nombre, &detected.descripcion)
                .await;
            ChecklistItem {
                name: detected.nombre,
                description: detected.descripcion,
                category: detected.categoria,
                always_required: false,
                references,
            }
        });
        Ok(join_all(resolutions).await)
    }
}

/// Caps a chunk excerpt at [`EXCERPT_GRAPHEMES`], marking the truncation.
fn excerpt_of(text: &str) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= EXCERPT_GRAPHEMES {
        text.to_string()
    } else {
        let mut excerpt: String = graphemes[..EXCERPT_GRAPHEMES].concat();
        excerpt.push_str("...");
        excerpt
    }
}

fn annotate_chunks(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "[Página {}, Sección: {}]\n{}",
                chunk.page, chunk.section, chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn detection_prompt(context: &str) -> String {
    let baseline_names = BASELINE_ITEMS
        .iter()
        .map(|item| format!("- {}", item.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Eres un experto en contratación estatal colombiana.
Analiza el siguiente extracto del pliego y extrae ÚNICAMENTE los documentos ESPECÍFICOS requeridos que NO estén en esta lista base:
{baseline_names}

EXTRACTO DEL PLIEGO:
{context}

Identifica documentos ADICIONALES como:
- Certificaciones de experiencia específicas
- Licencias o permisos especiales
- Certificados técnicos o de calidad
- Documentos financieros específicos
- Certificaciones de personal
- Autorizaciones especiales

Responde ÚNICAMENTE con un JSON válido en este formato:
{{
  "documentos": [
    {{
      "nombre": "nombre del documento",
      "descripcion": "descripción breve",
      "categoria": "experiencia|tecnico|financiero|legal|otros"
    }}
  ]
}}

Si no hay documentos adicionales específicos, retorna: {{"documentos": []}}"#
    )
}
