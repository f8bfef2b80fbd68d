//! Structured summary sheet for a tender document.
//!
//! One generation call extracts the key facts of a tender (process number,
//! contracting entity, object, budget, deadlines, ...) as a JSON object. The
//! model's output is read with the same tagged extraction the checklist uses,
//! so a malformed response is returned to the caller instead of failing.

use std::sync::Arc;

use crate::generation::{GenerationProvider, JsonExtraction, extract_json_object};
use crate::types::RagError;

/// Result of a summary request.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryOutcome {
    /// The extracted fact sheet.
    Parsed(serde_json::Value),
    /// The model did not return parseable JSON; raw text preserved.
    Malformed(String),
}

/// Produces tender fact sheets via a single generation call.
pub struct TenderSummarizer {
    generator: Arc<dyn GenerationProvider>,
    model: String,
}

impl TenderSummarizer {
    pub fn new(generator: Arc<dyn GenerationProvider>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Summarizes `full_text` into a structured fact sheet.
    ///
    /// Transport and timeout failures surface as errors; output that merely
    /// fails to parse comes back as [`SummaryOutcome::Malformed`].
    pub async fn summarize(&self, full_text: &str) -> Result<SummaryOutcome, RagError> {
        let prompt = summary_prompt(full_text);
        let generated = self.generator.generate(&self.model, &prompt).await?;
        match extract_json_object(&generated.text) {
            JsonExtraction::Parsed(value) => Ok(SummaryOutcome::Parsed(value)),
            JsonExtraction::Malformed(raw) => {
                tracing::warn!(model = %self.model, "summary output was not valid JSON");
                Ok(SummaryOutcome::Malformed(raw))
            }
        }
    }
}

fn summary_prompt(full_text: &str) -> String {
    format!(
        r#"Eres un experto en contratación estatal colombiana.
Analiza el siguiente pliego de condiciones y extrae la información clave.

PLIEGO DE CONDICIONES:
{full_text}

Responde ÚNICAMENTE con un JSON válido (sin texto adicional) con esta estructura:
{{
    "numero_proceso": "número o código del proceso",
    "entidad": "nombre de la entidad contratante",
    "objeto": "objeto del contrato (resumido)",
    "presupuesto": "presupuesto oficial",
    "fecha_cierre": "fecha límite para presentar ofertas",
    "experiencia_requerida": "requisitos de experiencia",
    "garantias": "garantías solicitadas",
    "criterios_evaluacion": "criterios y ponderación",
    "observaciones": "puntos importantes a tener en cuenta"
}}"#
    )
}
