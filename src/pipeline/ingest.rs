use std::sync::Arc;

use tracing::{info, warn};

use crate::core::error::{Error, Result};
use crate::core::types::{DocId, IngestStage};
use crate::extract::client::TextExtractor;
use crate::index::handle::SearchIndex;
use crate::storage::blob::BlobStore;

/// Outcome of one ingestion. The pipeline is intentionally
/// non-transactional past the blob write: `stage` tells how far the
/// document got, and `degraded` carries the extraction or index failure
/// so callers and tests observe the stored-but-unsearchable state
/// directly instead of scraping logs.
#[derive(Debug)]
pub struct IngestReceipt {
    pub doc_id: DocId,
    pub stage: IngestStage,
    pub degraded: Option<Error>,
}

impl IngestReceipt {
    pub fn is_searchable(&self) -> bool {
        self.stage == IngestStage::Indexed
    }
}

/// Sequences storage, extraction and indexing for one upload.
pub struct IngestionPipeline {
    blobs: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    index: Arc<SearchIndex>,
}

impl IngestionPipeline {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        index: Arc<SearchIndex>,
    ) -> Self {
        IngestionPipeline {
            blobs,
            extractor,
            index,
        }
    }

    /// Validate, store, extract, index. Only validation and blob storage
    /// can fail the call: once the bytes are durably stored the caller
    /// always gets the id, and extraction/index failures leave the
    /// document retrievable but absent from search.
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> Result<IngestReceipt> {
        validate_upload(bytes, filename)?;

        let doc_id = self.blobs.put(bytes)?;

        let text = match self.extractor.extract(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(id = %doc_id, error = %e, "extraction failed, document stored unindexed");
                return Ok(IngestReceipt {
                    doc_id,
                    stage: IngestStage::Stored,
                    degraded: Some(e),
                });
            }
        };

        if let Err(e) = self.index.upsert(doc_id.clone(), &text) {
            warn!(id = %doc_id, error = %e, "indexing failed, document stored unindexed");
            return Ok(IngestReceipt {
                doc_id,
                stage: IngestStage::Extracted,
                degraded: Some(e),
            });
        }

        info!(id = %doc_id, "document ingested and indexed");
        Ok(IngestReceipt {
            doc_id,
            stage: IngestStage::Indexed,
            degraded: None,
        })
    }
}

/// Rejects before any storage side effect.
fn validate_upload(bytes: &[u8], filename: &str) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::validation("empty upload"));
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::validation(format!(
            "only PDF uploads are accepted, got {:?}",
            filename
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::extract::client::fakes::{EchoExtractor, FailingExtractor};
    use crate::storage::blob::FsBlobStore;
    use crate::storage::wal::SyncMode;
    use std::sync::atomic::Ordering;

    struct Fixture {
        _dir: tempfile::TempDir,
        blobs: Arc<FsBlobStore>,
        index: Arc<SearchIndex>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blobs = Arc::new(FsBlobStore::open(dir.path().join("pdfs")).unwrap());
        let index =
            Arc::new(SearchIndex::open(dir.path().join("index"), 1, SyncMode::Batch).unwrap());
        Fixture {
            _dir: dir,
            blobs,
            index,
        }
    }

    fn pipeline(f: &Fixture, extractor: Arc<dyn TextExtractor>) -> IngestionPipeline {
        IngestionPipeline::new(f.blobs.clone(), extractor, f.index.clone())
    }

    #[test]
    fn test_successful_ingest_reaches_indexed_stage() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        let receipt = p.ingest(b"annual revenue growth", "report.pdf").unwrap();
        assert_eq!(receipt.stage, IngestStage::Indexed);
        assert!(receipt.degraded.is_none());
        assert!(receipt.is_searchable());
        assert_eq!(f.index.index_version(&receipt.doc_id), Some(1));
    }

    #[test]
    fn test_non_pdf_filename_rejected_before_storage() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        for name in ["report.txt", "report", "pdf", "report.pdf.exe"] {
            let err = p.ingest(b"content", name).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "filename {:?}", name);
        }
        // No blob was written
        assert_eq!(f.index.doc_count(), 0);
        assert_eq!(std::fs::read_dir(f._dir.path().join("pdfs")).unwrap().count(), 0);
    }

    #[test]
    fn test_pdf_suffix_check_is_case_insensitive() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        assert!(p.ingest(b"content", "REPORT.PDF").is_ok());
        assert!(p.ingest(b"content", "Report.Pdf").is_ok());
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        let err = p.ingest(b"", "report.pdf").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_extraction_failure_degrades_but_does_not_fail() {
        let f = fixture();
        let extractor = Arc::new(FailingExtractor::new());
        let p = pipeline(&f, extractor.clone());

        let receipt = p.ingest(b"opaque pdf bytes", "report.pdf").unwrap();
        assert_eq!(receipt.stage, IngestStage::Stored);
        let degraded = receipt.degraded.as_ref().unwrap();
        assert_eq!(degraded.kind, ErrorKind::Extraction);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);

        // Retrievable but absent from search
        assert_eq!(f.blobs.get(&receipt.doc_id).unwrap(), b"opaque pdf bytes");
        assert_eq!(f.index.index_version(&receipt.doc_id), None);
    }

    #[test]
    fn test_index_failure_degrades_but_does_not_fail() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        // A closed index rejects upserts, standing in for a persistence failure
        f.index.close().unwrap();

        let receipt = p.ingest(b"searchable words", "report.pdf").unwrap();
        assert_eq!(receipt.stage, IngestStage::Extracted);
        assert_eq!(receipt.degraded.as_ref().unwrap().kind, ErrorKind::Index);
        assert!(f.blobs.contains(&receipt.doc_id));
    }

    #[test]
    fn test_repeated_ingests_yield_distinct_ids() {
        let f = fixture();
        let p = pipeline(&f, Arc::new(EchoExtractor));

        let a = p.ingest(b"same", "a.pdf").unwrap().doc_id;
        let b = p.ingest(b"same", "a.pdf").unwrap().doc_id;
        assert_ne!(a, b);
    }
}
