//! SQLite-backed embedding index using the `sqlite-vec` extension.

use std::os::raw::c_char;
use std::path::Path;
use std::sync::{Arc, Once};
use std::mem::transmute;

use tokio_rusqlite::{Connection, OptionalExtension, ffi, params_from_iter};

use super::{Collection, RetrievedChunk};
use crate::embeddings::EmbeddingProvider;
use crate::segmenter::Chunk;
use crate::types::RagError;

/// Embedding index over one SQLite database.
///
/// Rows are keyed by `{document_id}:{chunk_id}`, so re-upserting a chunk
/// overwrites it in place. All state is partitioned by document id; upserts
/// and queries for different ids are safe to run concurrently, while an
/// upsert racing a delete of the *same* id must be serialized by the caller.
#[derive(Clone)]
pub struct SqliteChunkIndex {
    conn: Connection,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SqliteChunkIndex {
    /// Opens (or creates) the index database at `path`.
    ///
    /// Registers the `sqlite-vec` extension process-wide on first use and
    /// creates the chunk and embedding tables for both collections, sized to
    /// the provider's vector dimensionality.
    pub async fn open(
        path: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RagError> {
        register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        conn.call(|conn| {
            let result = conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0));
            match result {
                Ok(_) => Ok(()),
                Err(err) => Err(tokio_rusqlite::Error::Error(err)),
            }
        })
        .await
        .map_err(|err| RagError::Storage(err.to_string()))?;

        let dimensions = embedder.dimensions();
        conn.call(move |conn| -> tokio_rusqlite::Result<()> {
            for collection in [Collection::Tenders, Collection::Reference] {
                conn.execute(
                    &format!(
                        "CREATE TABLE IF NOT EXISTS {} (
                            id TEXT PRIMARY KEY,
                            document_id TEXT NOT NULL,
                            chunk_id INTEGER NOT NULL,
                            content TEXT NOT NULL,
                            page INTEGER NOT NULL,
                            section TEXT NOT NULL,
                            start_word INTEGER NOT NULL,
                            end_word INTEGER NOT NULL,
                            word_count INTEGER NOT NULL
                        )",
                        collection.chunk_table()
                    ),
                    [],
                )
                ?;
                conn.execute(
                    &format!(
                        "CREATE INDEX IF NOT EXISTS idx_{0}_document ON {0}(document_id)",
                        collection.chunk_table()
                    ),
                    [],
                )
                ?;
                conn.execute(
                    &format!(
                        "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING vec0(embedding float[{}])",
                        collection.embedding_table(),
                        dimensions
                    ),
                    [],
                )
                ?;
            }
            Ok(())
        })
        .await
        .map_err(|err| RagError::Storage(err.to_string()))?;

        Ok(Self { conn, embedder })
    }

    /// Embeds and stores `chunks` under `document_id` in `collection`.
    ///
    /// Existing rows with the same `{document_id}:{chunk_id}` key are
    /// replaced, keeping the operation idempotent.
    pub async fn upsert(
        &self,
        collection: Collection,
        document_id: &str,
        chunks: &[Chunk],
    ) -> Result<(), RagError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "provider '{}' returned {} vectors for {} inputs",
                self.embedder.name(),
                vectors.len(),
                chunks.len()
            )));
        }

        let rows: Vec<StoredRow> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| StoredRow {
                key: format!("{document_id}:{}", chunk.id),
                document_id: document_id.to_string(),
                chunk_id: chunk.id as i64,
                content: chunk.text.clone(),
                page: chunk.page as i64,
                section: chunk.section.clone(),
                start_word: chunk.start_word as i64,
                end_word: chunk.end_word as i64,
                word_count: chunk.word_count as i64,
                embedding_json: encode_vector(&vector),
            })
            .collect();
        let inserted = rows.len();

        self.conn
            .call(move |conn| -> tokio_rusqlite::Result<()> {
                let tx = conn.transaction()?;
                for row in rows {
                    let existing: Option<i64> = tx
                        .query_row(
                            &format!(
                                "SELECT rowid FROM {} WHERE id = ?1",
                                collection.chunk_table()
                            ),
                            (row.key.as_str(),),
                            |r| r.get(0),
                        )
                        .optional()
                        ?;
                    if let Some(rowid) = existing {
                        tx.execute(
                            &format!(
                                "DELETE FROM {} WHERE rowid = ?1",
                                collection.embedding_table()
                            ),
                            (rowid,),
                        )
                        ?;
                        tx.execute(
                            &format!("DELETE FROM {} WHERE rowid = ?1", collection.chunk_table()),
                            (rowid,),
                        )
                        ?;
                    }
                    tx.execute(
                        &format!(
                            "INSERT INTO {} (id, document_id, chunk_id, content, page, section, \
                             start_word, end_word, word_count) \
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                            collection.chunk_table()
                        ),
                        (
                            row.key.as_str(),
                            row.document_id.as_str(),
                            row.chunk_id,
                            row.content.as_str(),
                            row.page,
                            row.section.as_str(),
                            row.start_word,
                            row.end_word,
                            row.word_count,
                        ),
                    )
                    ?;
                    let rowid = tx.last_insert_rowid();
                    tx.execute(
                        &format!(
                            "INSERT INTO {} (rowid, embedding) VALUES (?1, ?2)",
                            collection.embedding_table()
                        ),
                        (rowid, row.embedding_json.as_str()),
                    )
                    ?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        tracing::debug!(document_id, chunks = inserted, "upserted chunks");
        Ok(())
    }

    /// Nearest-neighbor search for `text`, optionally scoped to one document.
    ///
    /// The query text is embedded once. Results come back in ascending cosine
    /// distance, ties broken by chunk id; at most `k` rows. A document id with
    /// no entries yields an empty result, not an error.
    pub async fn query(
        &self,
        collection: Collection,
        text: &str,
        document_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        let vectors = self.embedder.embed_batch(&[text.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("provider returned no vector".into()))?;
        let embedding_json = encode_vector(&query_vector);

        let where_clause = match document_id {
            Some(_) => "WHERE c.document_id = ?2",
            None => "",
        };
        let sql = format!(
            "SELECT c.chunk_id, c.content, c.page, c.section, \
             vec_distance_cosine(e.embedding, vec_f32(?1)) AS distance \
             FROM {chunks} c JOIN {embeddings} e ON c.rowid = e.rowid \
             {where_clause} \
             ORDER BY distance ASC, c.chunk_id ASC \
             LIMIT {k}",
            chunks = collection.chunk_table(),
            embeddings = collection.embedding_table(),
        );

        let mut params: Vec<String> = vec![embedding_json];
        if let Some(doc) = document_id {
            params.push(doc.to_string());
        }

        self.conn
            .call(move |conn| -> tokio_rusqlite::Result<Vec<RetrievedChunk>> {
                let mut stmt = conn
                    .prepare(&sql)
                    ?;
                let rows = stmt
                    .query_map(params_from_iter(params.iter()), |row| {
                        Ok(RetrievedChunk {
                            chunk_id: row.get::<_, i64>(0)? as usize,
                            text: row.get(1)?,
                            page: row.get::<_, i64>(2)? as u32,
                            section: row.get(3)?,
                            distance: row.get(4)?,
                        })
                    })
                    ?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    /// Removes every entry for `document_id` in `collection`.
    ///
    /// Deleting an id with no entries is a no-op, so cleanup calls are safe
    /// to issue unconditionally.
    pub async fn delete(&self, collection: Collection, document_id: &str) -> Result<(), RagError> {
        let id = document_id.to_string();
        let removed = self
            .conn
            .call(move |conn| -> tokio_rusqlite::Result<usize> {
                let tx = conn.transaction()?;
                tx.execute(
                    &format!(
                        "DELETE FROM {embeddings} WHERE rowid IN \
                         (SELECT rowid FROM {chunks} WHERE document_id = ?1)",
                        embeddings = collection.embedding_table(),
                        chunks = collection.chunk_table(),
                    ),
                    (id.as_str(),),
                )
                ?;
                let removed = tx
                    .execute(
                        &format!(
                            "DELETE FROM {} WHERE document_id = ?1",
                            collection.chunk_table()
                        ),
                        (id.as_str(),),
                    )
                    ?;
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(|err| {
                tracing::warn!(document_id, error = %err, "failed to delete document partition");
                RagError::Storage(err.to_string())
            })?;

        tracing::debug!(document_id, removed, "deleted document partition");
        Ok(())
    }
}

struct StoredRow {
    key: String,
    document_id: String,
    chunk_id: i64,
    content: String,
    page: i64,
    section: String,
    start_word: i64,
    end_word: i64,
    word_count: i64,
    embedding_json: String,
}

/// sqlite-vec accepts vectors as JSON text via `vec_f32`.
fn encode_vector(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 10 + 2);
    out.push('[');
    for (index, value) in vector.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&value.to_string());
    }
    out.push(']');
    out
}

fn register_sqlite_vec() -> Result<(), RagError> {
    use std::sync::Mutex;

    static INIT: Once = Once::new();
    static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

    INIT.call_once(|| {
        let result = unsafe {
            type SqliteExtensionInit = unsafe extern "C" fn(
                *mut ffi::sqlite3,
                *mut *mut c_char,
                *const ffi::sqlite3_api_routines,
            ) -> i32;

            let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
            let init_fn: SqliteExtensionInit =
                transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
            let rc = ffi::sqlite3_auto_extension(Some(init_fn));
            if rc != 0 {
                Err(format!(
                    "failed to register sqlite-vec extension (code {rc})"
                ))
            } else {
                Ok(())
            }
        };
        *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
    });

    INIT_RESULT
        .lock()
        .expect("init result mutex poisoned")
        .clone()
        .expect("init was called but result not set")
        .map_err(RagError::Storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_encode_as_json_arrays() {
        assert_eq!(encode_vector(&[0.5, -1.0, 0.0]), "[0.5,-1,0]");
        assert_eq!(encode_vector(&[]), "[]");
    }
}
