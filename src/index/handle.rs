use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::index::inverted::{InvertedIndex, Term};
use crate::scoring::scorer::{Bm25Scorer, DocStats, Scorer};
use crate::search::results::{ScoredDocument, TopKCollector};
use crate::storage::checkpoint::Checkpoint;
use crate::storage::layout::StorageLayout;
use crate::storage::wal::{Operation, SyncMode, Wal};

/// Process-wide persistent index handle, shared by the ingestion and query
/// paths. All mutable state sits behind one RwLock: queries take read
/// locks, upserts write locks, so a query observes either the pre- or
/// post-state of any upsert, never a partial one.
pub struct SearchIndex {
    tokenizer: StandardTokenizer,
    scorer: Box<dyn Scorer>,
    layout: StorageLayout,
    state: RwLock<IndexState>,
    closed: AtomicBool,
}

struct IndexState {
    index: InvertedIndex,
    wal: Wal,
}

impl SearchIndex {
    /// Open the index at `path`, creating an empty one if none exists.
    /// A path that exists but does not hold a valid index is a `Storage`
    /// error. Recovery order: checkpoint first, then WAL entries recorded
    /// at or after the checkpoint's sequence.
    pub fn open(path: PathBuf, min_token_len: usize, sync_mode: SyncMode) -> Result<Self> {
        let layout = StorageLayout::new(path.clone())
            .map_err(|e| Error::storage(format!("cannot open index at {}: {}", path.display(), e)))?;

        let checkpoint = Checkpoint::load(&layout)?;
        let (mut index, covered_seq) = match checkpoint {
            Some(cp) => {
                info!(docs = cp.doc_count, seq = cp.wal_sequence, "loaded index checkpoint");
                (cp.index, cp.wal_sequence)
            }
            None => (InvertedIndex::new(), 0),
        };

        let tokenizer = StandardTokenizer::new(min_token_len);

        // Replay whatever the last checkpoint did not cover
        let mut next_seq = covered_seq;
        let mut replayed = 0usize;
        for file_seq in Wal::find_wal_files(&layout)? {
            let mut wal = Wal::open(&layout, file_seq, sync_mode)?;
            for entry in wal.read_entries()? {
                if entry.sequence < covered_seq {
                    continue;
                }
                let Operation::Upsert { doc_id, text } = entry.operation;
                index.upsert_document(doc_id, &tokenizer.tokenize(&text));
                next_seq = next_seq.max(entry.sequence + 1);
                replayed += 1;
            }
        }
        if replayed > 0 {
            info!(replayed, "replayed WAL entries");
        }

        // Fold the replayed entries into a fresh checkpoint and retire the
        // old WAL files so sequences are never appended twice.
        Checkpoint::save(&index, next_seq, &layout)?;
        for file_seq in Wal::find_wal_files(&layout)? {
            if file_seq < next_seq {
                let _ = std::fs::remove_file(layout.wal_path(file_seq));
            }
        }
        let wal = Wal::open(&layout, next_seq, sync_mode)?;

        info!(path = %path.display(), docs = index.doc_count(), "index open");

        Ok(SearchIndex {
            tokenizer,
            scorer: Box::new(Bm25Scorer::default()),
            layout,
            state: RwLock::new(IndexState { index, wal }),
            closed: AtomicBool::new(false),
        })
    }

    pub fn tokenizer(&self) -> &StandardTokenizer {
        &self.tokenizer
    }

    /// Tokenize `text` and atomically replace all postings for `doc_id`.
    /// Same-document upserts are serialized by the write lock; last call
    /// wins.
    pub fn upsert(&self, doc_id: DocId, text: &str) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::index("index is closed"));
        }

        let tokens = self.tokenizer.tokenize(text);

        let mut state = self.state.write();
        state
            .wal
            .append(Operation::Upsert {
                doc_id: doc_id.clone(),
                text: text.to_string(),
            })
            .map_err(|e| Error::index(format!("WAL append failed: {}", e)))?;
        state.index.upsert_document(doc_id.clone(), &tokens);

        debug!(id = %doc_id, tokens = tokens.len(), "document indexed");
        Ok(())
    }

    /// Top-k lookup over already-normalized terms. Scores accumulate per
    /// document across distinct terms; ordering is deterministic for a
    /// fixed index state (score descending, doc id ascending on ties).
    pub fn query(&self, terms: &[Term], top_k: usize) -> Vec<ScoredDocument> {
        let state = self.state.read();
        let index = &state.index;
        let avg_doc_length = index.avg_doc_length();

        let mut seen: HashSet<&Term> = HashSet::new();
        let mut scores: std::collections::HashMap<DocId, f32> = std::collections::HashMap::new();
        for term in terms {
            if !seen.insert(term) {
                continue; // repeated query terms count once
            }
            let Some(list) = index.posting_list(term) else {
                continue;
            };
            let idf = index.idf(term);
            for posting in list.iter() {
                let stats = DocStats {
                    doc_length: index.doc_length(&posting.doc_id).unwrap_or(0),
                    avg_doc_length,
                };
                *scores.entry(posting.doc_id.clone()).or_insert(0.0) +=
                    self.scorer.score(posting, idf, &stats);
            }
        }

        let mut collector = TopKCollector::new(top_k);
        for (doc_id, score) in scores {
            collector.collect(ScoredDocument { doc_id, score });
        }
        collector.into_results()
    }

    pub fn doc_count(&self) -> usize {
        self.state.read().index.doc_count()
    }

    pub fn term_count(&self) -> usize {
        self.state.read().index.term_count()
    }

    /// Monotonic re-index counter for a document, if it was ever indexed.
    pub fn index_version(&self, doc_id: &DocId) -> Option<u64> {
        self.state.read().index.version(doc_id)
    }

    /// Checkpoint the in-memory state and retire covered WAL entries.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.write();
        Checkpoint::save(&state.index, state.wal.sequence, &self.layout)?;
        let covered = state.wal.sequence;
        state.wal.rotate(&self.layout)?;
        for file_seq in Wal::find_wal_files(&self.layout)? {
            if file_seq < covered {
                let _ = std::fs::remove_file(self.layout.wal_path(file_seq));
            }
        }
        Ok(())
    }

    /// Flush and release the persistent store. Exactly once at shutdown;
    /// a second call is an error.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::index("index already closed"));
        }
        self.flush()?;
        let mut state = self.state.write();
        state.wal.sync()?;
        info!(docs = state.index.doc_count(), "index closed");
        Ok(())
    }
}

impl Drop for SearchIndex {
    fn drop(&mut self) {
        // Release on every exit path: if close() was never reached, make a
        // best-effort flush rather than dropping buffered state.
        if !self.closed.swap(true, Ordering::AcqRel) {
            if let Err(e) = self.flush() {
                warn!(error = %e, "flush on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<Term> {
        StandardTokenizer::default()
            .tokenize(text)
            .into_iter()
            .map(|t| Term(t.text))
            .collect()
    }

    fn ids(hits: &[ScoredDocument]) -> Vec<String> {
        hits.iter().map(|h| h.doc_id.0.clone()).collect()
    }

    #[test]
    fn test_upsert_then_query_finds_document() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

        index.upsert(DocId::from("d-001"), "annual revenue growth").unwrap();

        let hits = index.query(&terms("revenue"), 20);
        assert_eq!(ids(&hits), vec!["d-001"]);
        assert!(index.query(&terms("nonexistentword"), 20).is_empty());
    }

    #[test]
    fn test_more_occurrences_rank_at_least_as_high() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

        // Same length, different term frequency. A third document that
        // never mentions the term keeps its document frequency below the
        // corpus size, so the inverse document frequency stays positive.
        index.upsert(DocId::from("a"), "revenue filler filler filler").unwrap();
        index.upsert(DocId::from("b"), "revenue revenue revenue filler").unwrap();
        index.upsert(DocId::from("c"), "unrelated material about logistics").unwrap();

        let hits = index.query(&terms("revenue"), 20);
        assert_eq!(ids(&hits), vec!["b", "a"]);
    }

    #[test]
    fn test_more_matched_terms_rank_at_least_as_high() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

        index.upsert(DocId::from("a"), "annual report").unwrap();
        index.upsert(DocId::from("b"), "annual revenue").unwrap();

        let hits = index.query(&terms("annual revenue"), 20);
        assert_eq!(ids(&hits), vec!["b", "a"]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

        for i in 0..10 {
            index
                .upsert(DocId(format!("d-{:03}", i)), "same exact words")
                .unwrap();
        }

        let first = ids(&index.query(&terms("words"), 5));
        for _ in 0..5 {
            assert_eq!(ids(&index.query(&terms("words"), 5)), first);
        }
        // All ties: ascending id order
        assert_eq!(first, vec!["d-000", "d-001", "d-002", "d-003", "d-004"]);
    }

    #[test]
    fn test_top_k_bounds_result_size() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

        for i in 0..30 {
            index.upsert(DocId(format!("d-{:03}", i)), "shared term").unwrap();
        }
        assert_eq!(index.query(&terms("shared"), 20).len(), 20);
    }

    #[test]
    fn test_reopen_recovers_unflushed_upserts_from_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idx");
        {
            let index = SearchIndex::open(path.clone(), 1, SyncMode::Batch).unwrap();
            index.upsert(DocId::from("d-001"), "annual revenue growth").unwrap();
            index.close().unwrap();
        }

        let index = SearchIndex::open(path, 1, SyncMode::Batch).unwrap();
        assert_eq!(index.doc_count(), 1);
        let hits = index.query(&terms("growth"), 20);
        assert_eq!(ids(&hits), vec!["d-001"]);
    }

    #[test]
    fn test_reopen_after_drop_without_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idx");
        {
            let index = SearchIndex::open(path.clone(), 1, SyncMode::Batch).unwrap();
            index.upsert(DocId::from("d-001"), "quarterly figures").unwrap();
            // dropped without close(); Drop flushes best-effort
        }

        let index = SearchIndex::open(path, 1, SyncMode::Batch).unwrap();
        assert_eq!(ids(&index.query(&terms("quarterly"), 20)), vec!["d-001"]);
    }

    #[test]
    fn test_close_twice_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();
        index.close().unwrap();
        assert!(index.close().is_err());
        assert!(index.upsert(DocId::from("d"), "text").is_err());
    }

    #[test]
    fn test_open_on_invalid_index_fails_with_storage_error() {
        use crate::core::error::ErrorKind;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idx");
        std::fs::create_dir_all(path.join("meta")).unwrap();
        std::fs::write(path.join("meta").join("checkpoint.bin"), b"garbage").unwrap();

        let err = SearchIndex::open(path, 1, SyncMode::Batch).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Storage);
    }

    #[test]
    fn test_reindex_changes_visibility_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();
        let id = DocId::from("d-001");

        index.upsert(id.clone(), "old content").unwrap();
        index.upsert(id.clone(), "new content").unwrap();

        assert!(index.query(&terms("old"), 20).is_empty());
        assert_eq!(ids(&index.query(&terms("new"), 20)), vec!["d-001"]);
        assert_eq!(index.index_version(&id), Some(2));
    }

    #[test]
    fn test_concurrent_queries_and_upserts() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap());

        let writer = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                for i in 0..50 {
                    index
                        .upsert(DocId(format!("d-{:03}", i)), "concurrent revenue data")
                        .unwrap();
                }
            })
        };
        let reader = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let hits = index.query(&terms("revenue"), 100);
                    // Every visible hit reflects a completed upsert
                    for hit in &hits {
                        assert!(index.index_version(&hit.doc_id).is_some());
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(index.doc_count(), 50);
    }
}
