use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{DocId, IngestStage};
use crate::extract::client::{HttpTextExtractor, TextExtractor};
use crate::index::handle::SearchIndex;
use crate::pipeline::ingest::IngestionPipeline;
use crate::query::engine::QueryEngine;
use crate::storage::blob::{BlobStore, FsBlobStore};

/// Response returned to the client once the upload is durably stored.
/// `stage` reports how far ingestion got; a degraded ingest still carries
/// the id.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: DocId,
    pub stage: IngestStage,
}

/// Transport-agnostic boundary over the four operations: ingest, fetch,
/// extract-on-demand, search. Owns the one process-wide index handle and
/// injects it into both the ingestion and query paths.
pub struct SearchService {
    blobs: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    index: Arc<SearchIndex>,
    pipeline: IngestionPipeline,
    engine: QueryEngine,
    default_top_k: usize,
}

impl SearchService {
    /// Wire the service from config: filesystem blob store and HTTP
    /// extraction client.
    pub fn open(config: &Config) -> Result<Self> {
        let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::open(config.blob_dir.clone())?);
        let extractor: Arc<dyn TextExtractor> = Arc::new(HttpTextExtractor::new(
            config.extractor_endpoint.clone(),
            config.extractor_timeout,
        )?);
        Self::with_collaborators(blobs, extractor, config)
    }

    /// Wire the service around injected collaborators; tests use this with
    /// fake extractors and the demos with in-process ones.
    pub fn with_collaborators(
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        config: &Config,
    ) -> Result<Self> {
        let index = Arc::new(SearchIndex::open(
            config.index_dir.clone(),
            config.min_token_len,
            config.wal_sync_mode,
        )?);
        let pipeline =
            IngestionPipeline::new(blobs.clone(), extractor.clone(), Arc::clone(&index));
        let engine = QueryEngine::new(Arc::clone(&index), config.max_top_k);

        info!(blob_dir = %config.blob_dir.display(), index_dir = %config.index_dir.display(), "service ready");

        Ok(SearchService {
            blobs,
            extractor,
            index,
            pipeline,
            engine,
            default_top_k: config.max_top_k,
        })
    }

    /// Upload: returns the document id once the bytes are durably stored,
    /// whether or not extraction and indexing succeeded.
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> Result<IngestResponse> {
        let receipt = self.pipeline.ingest(bytes, filename)?;
        Ok(IngestResponse {
            id: receipt.doc_id,
            stage: receipt.stage,
        })
    }

    /// Raw PDF bytes for an id.
    pub fn fetch(&self, id: &DocId) -> Result<Vec<u8>> {
        self.blobs.get(id)
    }

    /// Plain text for an id, recomputed on every call. Nothing is cached:
    /// the text always reflects the current extractor, at the price of
    /// repeating the extraction work.
    pub fn extract_on_demand(&self, id: &DocId) -> Result<String> {
        let bytes = self.blobs.get(id)?;
        self.extractor.extract(&bytes)
    }

    /// Ranked document ids for a free-text query.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        self.engine.search(query, self.default_top_k)
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Release the index. Exactly once at shutdown.
    pub fn close(&self) -> Result<()> {
        self.index.close()
    }
}
