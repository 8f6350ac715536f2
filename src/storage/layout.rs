use std::fs;
use std::path::PathBuf;

use crate::core::error::Result;

/// Directory structure of a persistent index
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf, // root directory
    pub wal_dir: PathBuf,  // write-ahead log location
    pub meta_dir: PathBuf, // checkpoint/metadata location
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let wal_dir = base_dir.join("wal");
        let meta_dir = base_dir.join("meta");

        fs::create_dir_all(&wal_dir)?;
        fs::create_dir_all(&meta_dir)?;

        Ok(StorageLayout {
            base_dir,
            wal_dir,
            meta_dir,
        })
    }

    pub fn wal_path(&self, sequence: u64) -> PathBuf {
        self.wal_dir.join(format!("wal_{:08}.log", sequence))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.meta_dir.join("checkpoint.bin")
    }
}
