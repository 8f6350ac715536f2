use std::path::PathBuf;
use std::time::Duration;

use crate::storage::wal::SyncMode;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of raw PDF files, one `<id>.pdf` per document.
    pub blob_dir: PathBuf,
    /// Directory of the persistent inverted index (wal/ + meta/).
    pub index_dir: PathBuf,

    /// Extraction service endpoint and per-request timeout.
    pub extractor_endpoint: String,
    pub extractor_timeout: Duration,

    // Tokenizer policy, shared by indexing and querying
    pub min_token_len: usize,

    /// Upper bound on results returned by a single query.
    pub max_top_k: usize,

    /// Whether the write-ahead log fsyncs every append or only on
    /// flush and rotation.
    pub wal_sync_mode: SyncMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            blob_dir: PathBuf::from("./data/pdfs"),
            index_dir: PathBuf::from("./data/index"),
            extractor_endpoint: "http://localhost:8081/extract".to_string(),
            extractor_timeout: Duration::from_secs(30),
            min_token_len: 1,
            max_top_k: 20,
            wal_sync_mode: SyncMode::Batch,
        }
    }
}
