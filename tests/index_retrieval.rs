//! Integration tests for the SQLite embedding index.
//!
//! These run against a real on-disk database with the deterministic mock
//! embedding provider, so ranking, scoping, and deletion behavior are
//! exercised end to end without a model server.

use std::sync::Arc;

use tempfile::TempDir;

use pliego_rag::{Chunk, Collection, MockEmbeddingProvider, SqliteChunkIndex, UNLABELED_SECTION};

fn chunk(id: usize, document_id: &str, text: &str, page: u32, section: &str) -> Chunk {
    let word_count = text.split_whitespace().count();
    Chunk {
        id,
        document_id: document_id.to_string(),
        text: text.to_string(),
        start_word: id * 100,
        end_word: id * 100 + word_count,
        word_count,
        page,
        section: section.to_string(),
    }
}

async fn open_index(dir: &TempDir) -> SqliteChunkIndex {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pliego_rag=debug")
        .try_init();
    SqliteChunkIndex::open(
        dir.path().join("index.sqlite"),
        Arc::new(MockEmbeddingProvider::new()),
    )
    .await
    .expect("index should open")
}

#[tokio::test]
async fn query_is_scoped_to_the_given_document() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let doc_a = vec![
        chunk(0, "a", "garantía de seriedad de la oferta", 1, "garantias"),
        chunk(1, "a", "cronograma del proceso de selección", 2, "cronograma"),
    ];
    let doc_b = vec![chunk(
        0,
        "b",
        "garantía de seriedad de la oferta",
        9,
        "garantias",
    )];
    index.upsert(Collection::Tenders, "a", &doc_a).await.unwrap();
    index.upsert(Collection::Tenders, "b", &doc_b).await.unwrap();

    let hits = index
        .query(
            Collection::Tenders,
            "garantía de seriedad de la oferta",
            Some("a"),
            10,
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 2, "only document a's chunks may come back");
    assert!(hits.iter().all(|hit| hit.page != 9));
}

#[tokio::test]
async fn results_rank_by_ascending_distance() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let chunks = vec![
        chunk(0, "doc", "cronograma del proceso de selección", 1, "cronograma"),
        chunk(1, "doc", "garantía de seriedad de la oferta", 2, "garantias"),
    ];
    index
        .upsert(Collection::Tenders, "doc", &chunks)
        .await
        .unwrap();

    let hits = index
        .query(Collection::Tenders, "garantía de seriedad", Some("doc"), 2)
        .await
        .unwrap();

    assert_eq!(hits[0].chunk_id, 1, "closest chunk first");
    assert!(hits[0].distance <= hits[1].distance);
}

#[tokio::test]
async fn equal_distances_tie_break_by_chunk_id() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    // Identical text embeds identically under the mock provider.
    let chunks = vec![
        chunk(5, "doc", "requisitos habilitantes del proponente", 3, UNLABELED_SECTION),
        chunk(2, "doc", "requisitos habilitantes del proponente", 1, UNLABELED_SECTION),
    ];
    index
        .upsert(Collection::Tenders, "doc", &chunks)
        .await
        .unwrap();

    let hits = index
        .query(
            Collection::Tenders,
            "requisitos habilitantes del proponente",
            Some("doc"),
            10,
        )
        .await
        .unwrap();

    let ids: Vec<usize> = hits.iter().map(|hit| hit.chunk_id).collect();
    assert_eq!(ids, vec![2, 5]);
}

#[tokio::test]
async fn k_bounds_the_result_count() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let chunks: Vec<Chunk> = (0..5)
        .map(|id| chunk(id, "doc", &format!("texto del fragmento número {id}"), 1, UNLABELED_SECTION))
        .collect();
    index
        .upsert(Collection::Tenders, "doc", &chunks)
        .await
        .unwrap();

    let hits = index
        .query(Collection::Tenders, "texto del fragmento", Some("doc"), 3)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn unknown_document_yields_empty_results() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let hits = index
        .query(Collection::Tenders, "cualquier texto", Some("missing"), 5)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn delete_empties_the_partition_and_repeats_as_a_noop() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let chunks = vec![chunk(0, "doc", "objeto del contrato de suministro", 1, "objeto")];
    index
        .upsert(Collection::Tenders, "doc", &chunks)
        .await
        .unwrap();

    index.delete(Collection::Tenders, "doc").await.unwrap();
    let hits = index
        .query(Collection::Tenders, "objeto del contrato", Some("doc"), 5)
        .await
        .unwrap();
    assert!(hits.is_empty());

    // A second delete of the same id succeeds as a no-op.
    index.delete(Collection::Tenders, "doc").await.unwrap();
    // So does deleting an id that never existed.
    index.delete(Collection::Tenders, "never-there").await.unwrap();
}

#[tokio::test]
async fn reupserting_a_chunk_overwrites_in_place() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let original = vec![chunk(0, "doc", "presupuesto oficial inicial", 1, "presupuesto")];
    index
        .upsert(Collection::Tenders, "doc", &original)
        .await
        .unwrap();

    let replacement = vec![chunk(0, "doc", "presupuesto oficial corregido", 1, "presupuesto")];
    index
        .upsert(Collection::Tenders, "doc", &replacement)
        .await
        .unwrap();

    let hits = index
        .query(Collection::Tenders, "presupuesto oficial", Some("doc"), 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1, "the key was overwritten, not duplicated");
    assert_eq!(hits[0].text, "presupuesto oficial corregido");
}

#[tokio::test]
async fn tender_and_reference_collections_are_isolated() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir).await;

    let tender = vec![chunk(0, "doc", "garantía de cumplimiento exigida", 1, "garantias")];
    let norm = vec![chunk(0, "ley80", "la garantía de seriedad ampara la oferta", 1, UNLABELED_SECTION)];
    index
        .upsert(Collection::Tenders, "doc", &tender)
        .await
        .unwrap();
    index
        .upsert(Collection::Reference, "ley80", &norm)
        .await
        .unwrap();

    let tender_hits = index
        .query(Collection::Tenders, "garantía", Some("doc"), 10)
        .await
        .unwrap();
    assert_eq!(tender_hits.len(), 1);
    assert_eq!(tender_hits[0].text, "garantía de cumplimiento exigida");

    let reference_hits = index
        .query(Collection::Reference, "garantía", None, 10)
        .await
        .unwrap();
    assert_eq!(reference_hits.len(), 1);
    assert_eq!(reference_hits[0].text, "la garantía de seriedad ampara la oferta");
}
