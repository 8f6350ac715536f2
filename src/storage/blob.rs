use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::types::DocId;

/// Durable byte storage keyed by document id.
pub trait BlobStore: Send + Sync {
    /// Persist the bytes under a freshly minted id.
    fn put(&self, bytes: &[u8]) -> Result<DocId>;

    /// Fetch the raw bytes for an id. `NotFound` for unknown ids.
    fn get(&self, id: &DocId) -> Result<Vec<u8>>;

    fn contains(&self, id: &DocId) -> bool;
}

/// Filesystem blob store: one `<id>.pdf` per document under a base
/// directory. Distinct ids touch distinct files, so concurrent calls for
/// different documents never contend.
pub struct FsBlobStore {
    base_dir: PathBuf,
}

impl FsBlobStore {
    pub fn open(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .map_err(|e| Error::storage(format!("cannot create blob dir: {}", e)))?;
        Ok(FsBlobStore { base_dir })
    }

    fn blob_path(&self, id: &DocId) -> PathBuf {
        self.base_dir.join(format!("{}.pdf", id))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, bytes: &[u8]) -> Result<DocId> {
        let id = DocId::generate();
        let path = self.blob_path(&id);

        // Write to a temp file and rename, so a failed put leaves nothing
        // retrievable under the id.
        let tmp = path.with_extension("pdf.tmp");
        fs::write(&tmp, bytes)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                Error::storage(format!("failed to persist blob {}: {}", id, e))
            })?;

        debug!(id = %id, bytes = bytes.len(), "blob stored");
        Ok(id)
    }

    fn get(&self, id: &DocId) -> Result<Vec<u8>> {
        let path = self.blob_path(id);
        if !path.exists() {
            return Err(Error::not_found(format!("no document with id {}", id)));
        }
        fs::read(&path).map_err(|e| Error::storage(format!("failed to read blob {}: {}", id, e)))
    }

    fn contains(&self, id: &DocId) -> bool {
        self.blob_path(id).exists()
    }
}
