use std::fs;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};
use crate::index::inverted::InvertedIndex;
use crate::storage::layout::StorageLayout;

/// Durable snapshot of the full index state. WAL entries recorded at or
/// after `wal_sequence` are replayed on top of it during open.
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub wal_sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub doc_count: usize,
    pub index: InvertedIndex,
}

impl Checkpoint {
    pub fn capture(index: &InvertedIndex, wal_sequence: u64) -> Result<Vec<u8>> {
        let checkpoint = CheckpointRef {
            wal_sequence,
            timestamp: Utc::now(),
            doc_count: index.doc_count(),
            index,
        };
        Ok(bincode::serialize(&checkpoint)?)
    }

    /// Load the checkpoint, if one exists. A file that is present but does
    /// not decode means the path is not a valid index.
    pub fn load(storage: &StorageLayout) -> Result<Option<Self>> {
        let path = storage.checkpoint_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let checkpoint = bincode::deserialize(&data).map_err(|e| {
            Error::new(
                ErrorKind::Storage,
                format!("not a valid index at {}: {}", path.display(), e),
            )
        })?;
        Ok(Some(checkpoint))
    }

    /// Save atomically: write a temp file, then rename over the old
    /// checkpoint so a crash mid-write never leaves a half snapshot.
    pub fn save(index: &InvertedIndex, wal_sequence: u64, storage: &StorageLayout) -> Result<()> {
        let data = Self::capture(index, wal_sequence)?;
        let path = storage.checkpoint_path();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Borrowing mirror of `Checkpoint` so `save` does not clone the index.
#[derive(Serialize)]
struct CheckpointRef<'a> {
    wal_sequence: u64,
    timestamp: DateTime<Utc>,
    doc_count: usize,
    index: &'a InvertedIndex,
}
