use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque document identifier, assigned at ingestion time and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub String);

impl DocId {
    /// Mint a fresh id. UUID v4, so ids stay distinct across uploads
    /// without any shared counter.
    pub fn generate() -> Self {
        DocId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        DocId(id.to_string())
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a document ended up after one pass through the ingestion pipeline.
///
/// `Stored` and `Extracted` are valid permanent resting states: the bytes
/// are retrievable but the document is invisible to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestStage {
    Stored,
    Extracted,
    Indexed,
}
