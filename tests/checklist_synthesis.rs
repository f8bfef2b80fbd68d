//! Integration tests for checklist synthesis with mock capabilities.

use std::sync::Arc;

use tempfile::TempDir;

use pliego_rag::checklist::baseline::BASELINE_ITEMS;
use pliego_rag::{
    Chunk, ChecklistSynthesizer, Collection, MockEmbeddingProvider, MockGenerationProvider,
    RagError, Retriever, SqliteChunkIndex,
};

fn chunk(id: usize, text: &str, page: u32, section: &str) -> Chunk {
    let word_count = text.split_whitespace().count();
    Chunk {
        id,
        document_id: "tender-1".to_string(),
        text: text.to_string(),
        start_word: id * 100,
        end_word: id * 100 + word_count,
        word_count,
        page,
        section: section.to_string(),
    }
}

async fn seeded_synthesizer(
    dir: &TempDir,
    chunks: &[Chunk],
) -> (ChecklistSynthesizer, Arc<MockGenerationProvider>) {
    let index = SqliteChunkIndex::open(
        dir.path().join("index.sqlite"),
        Arc::new(MockEmbeddingProvider::new()),
    )
    .await
    .unwrap();
    if !chunks.is_empty() {
        index
            .upsert(Collection::Tenders, "tender-1", chunks)
            .await
            .unwrap();
    }
    let generator = Arc::new(MockGenerationProvider::new());
    let synthesizer =
        ChecklistSynthesizer::new(Retriever::new(index), generator.clone(), "test-model");
    (synthesizer, generator)
}

fn sample_chunks() -> Vec<Chunk> {
    vec![
        chunk(
            0,
            "El proponente debe aportar certificado de Cámara de Comercio y RUT actualizado",
            1,
            "requisitos_habilitantes",
        ),
        chunk(
            1,
            "Se exige garantía de seriedad de la oferta por el diez por ciento del presupuesto",
            2,
            "garantias",
        ),
        chunk(
            2,
            "La experiencia del proponente se acredita con tres contratos de objeto similar",
            3,
            "experiencia",
        ),
    ]
}

#[tokio::test]
async fn baseline_is_returned_in_full_when_detection_fails() {
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &sample_chunks()).await;
    generator.push_error(RagError::Transport("connection refused".into()));

    let checklist = synthesizer
        .synthesize("tender-1", "texto completo del pliego")
        .await
        .unwrap();

    assert_eq!(checklist.base_items.len(), BASELINE_ITEMS.len());
    assert!(checklist.specific_items.is_empty());
    assert_eq!(checklist.total, BASELINE_ITEMS.len());
    assert!(checklist.warning.is_some());
    assert!(checklist.base_items.iter().all(|item| item.always_required));
}

#[tokio::test]
async fn embedded_json_object_is_extracted_from_prose() {
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &sample_chunks()).await;
    generator.push_text(r#"preamble {"documentos":[]} trailing"#);

    let checklist = synthesizer
        .synthesize("tender-1", "texto completo del pliego")
        .await
        .unwrap();

    assert!(checklist.specific_items.is_empty());
    assert_eq!(checklist.total, checklist.base_items.len());
    assert!(checklist.warning.is_none(), "an empty list is not an error");
}

#[tokio::test]
async fn detected_items_are_resolved_and_counted() {
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &sample_chunks()).await;
    generator.push_text(
        r#"{"documentos": [
            {"nombre": "Licencia ambiental", "descripcion": "Licencia ambiental vigente", "categoria": "legal"},
            {"nombre": "Certificación ISO 9001", "descripcion": "Certificado de calidad vigente", "categoria": "tecnico"}
        ]}"#,
    );

    let checklist = synthesizer
        .synthesize("tender-1", "texto completo del pliego")
        .await
        .unwrap();

    assert_eq!(checklist.specific_items.len(), 2);
    assert_eq!(checklist.total, checklist.base_items.len() + 2);
    assert!(checklist.warning.is_none());

    let detected = &checklist.specific_items[0];
    assert_eq!(detected.name, "Licencia ambiental");
    assert_eq!(detected.category, "legal");
    assert!(!detected.always_required);
    assert!(
        !detected.references.is_empty(),
        "references resolve against the indexed chunks"
    );
}

#[tokio::test]
async fn references_are_deduplicated_by_page_and_section() {
    // Three chunks sharing one (page, section) pair collapse to one reference.
    let chunks = vec![
        chunk(0, "certificado de antecedentes fiscales del proponente", 1, "requisitos_habilitantes"),
        chunk(1, "certificado de antecedentes disciplinarios del proponente", 1, "requisitos_habilitantes"),
        chunk(2, "certificado de antecedentes judiciales del proponente", 1, "requisitos_habilitantes"),
    ];
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &chunks).await;
    generator.push_text(r#"{"documentos": []}"#);

    let checklist = synthesizer
        .synthesize("tender-1", "texto completo")
        .await
        .unwrap();

    for item in &checklist.base_items {
        assert!(
            item.references.len() <= 1,
            "all hits share (page, section); item '{}' had {} references",
            item.name,
            item.references.len()
        );
    }
}

#[tokio::test]
async fn garbage_output_degrades_to_a_warning() {
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &sample_chunks()).await;
    generator.push_text("lo siento, no encontré documentos adicionales");

    let checklist = synthesizer
        .synthesize("tender-1", "texto completo del pliego")
        .await
        .unwrap();

    assert_eq!(checklist.base_items.len(), BASELINE_ITEMS.len());
    assert!(checklist.specific_items.is_empty());
    assert!(checklist.warning.is_some());
}

#[tokio::test]
async fn unindexed_document_still_gets_a_detection_pass_over_raw_text() {
    let dir = TempDir::new().unwrap();
    let (synthesizer, generator) = seeded_synthesizer(&dir, &[]).await;
    generator.push_text(r#"{"documentos": []}"#);

    let full_text = "OBJETO: suministro de equipos de cómputo para la entidad contratante";
    let checklist = synthesizer.synthesize("tender-1", full_text).await.unwrap();

    assert_eq!(checklist.total, checklist.base_items.len());
    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0].prompt.contains("suministro de equipos"),
        "detection falls back to the head of the raw text"
    );
}
