use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;
use crate::storage::layout::StorageLayout;

// Entries above this are assumed to be corruption, not data
const MAX_ENTRY_BYTES: usize = 64 * 1024 * 1024;

/// Write-ahead log for index durability
pub struct Wal {
    file: File,
    pub position: u64,
    pub sequence: u64,
    pub sync_mode: SyncMode,
}

#[derive(Debug, Clone, Copy)]
pub enum SyncMode {
    Immediate, // fsync after every write
    Batch,     // fsync on flush/rotate only
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub sequence: u64,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// Full replacement of a document's postings. Replay re-tokenizes the
    /// text, so the tokenizer policy applies uniformly to recovered entries.
    Upsert { doc_id: DocId, text: String },
}

impl Wal {
    pub fn open(storage: &StorageLayout, sequence: u64, sync_mode: SyncMode) -> Result<Self> {
        let path = storage.wal_path(sequence);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let position = file.metadata()?.len();

        Ok(Wal {
            file,
            position,
            sequence,
            sync_mode,
        })
    }

    /// Append one entry: u32 length, u32 crc32 of the payload, payload.
    pub fn append(&mut self, operation: Operation) -> Result<()> {
        let entry = WalEntry {
            sequence: self.sequence,
            operation,
            timestamp: Utc::now(),
        };

        let data = bincode::serialize(&entry)?;
        let len = data.len() as u32;
        let checksum = crc32fast::hash(&data);

        self.file.write_all(&len.to_le_bytes())?;
        self.file.write_all(&checksum.to_le_bytes())?;
        self.file.write_all(&data)?;

        self.sequence += 1;
        self.position += 8 + data.len() as u64;

        if let SyncMode::Immediate = self.sync_mode {
            self.file.sync_all()?;
        }

        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Sync the current file and switch writes to a fresh one, effectively
    /// truncating entries already covered by a checkpoint.
    pub fn rotate(&mut self, storage: &StorageLayout) -> Result<()> {
        self.sync()?;
        let new_wal = Wal::open(storage, self.sequence, self.sync_mode)?;
        *self = new_wal;
        Ok(())
    }

    /// Read every decodable entry, stopping at the first truncated or
    /// corrupt record. Partial recovery is better than none.
    pub fn read_entries(&mut self) -> Result<Vec<WalEntry>> {
        let mut entries = Vec::new();
        self.file.seek(SeekFrom::Start(0))?;

        loop {
            let mut len_buf = [0u8; 4];
            match self.file.read_exact(&mut len_buf) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(Error::new(
                        ErrorKind::Io,
                        format!("failed to read WAL: {}", e),
                    ))
                }
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_ENTRY_BYTES {
                warn!(len, "oversized WAL entry, stopping replay");
                break;
            }

            let mut crc_buf = [0u8; 4];
            if self.file.read_exact(&mut crc_buf).is_err() {
                warn!("truncated WAL entry header, stopping replay");
                break;
            }
            let expected_crc = u32::from_le_bytes(crc_buf);

            let mut data = vec![0u8; len];
            if self.file.read_exact(&mut data).is_err() {
                warn!("truncated WAL entry body, stopping replay");
                break;
            }

            if crc32fast::hash(&data) != expected_crc {
                warn!("WAL entry checksum mismatch, stopping replay");
                break;
            }

            match bincode::deserialize::<WalEntry>(&data) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(error = %e, "undecodable WAL entry, stopping replay");
                    break;
                }
            }
        }

        self.position = self.file.seek(SeekFrom::End(0))?;
        if let Some(last) = entries.last() {
            self.sequence = last.sequence + 1;
        }

        Ok(entries)
    }

    /// WAL file sequences present on disk, in replay order.
    pub fn find_wal_files(storage: &StorageLayout) -> Result<Vec<u64>> {
        let mut sequences = Vec::new();

        if storage.wal_dir.exists() {
            for entry in std::fs::read_dir(&storage.wal_dir)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) != Some("log") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if let Some(seq) = stem.strip_prefix("wal_") {
                    if let Ok(seq) = seq.parse::<u64>() {
                        sequences.push(seq);
                    }
                }
            }
        }

        sequences.sort_unstable();
        Ok(sequences)
    }
}
