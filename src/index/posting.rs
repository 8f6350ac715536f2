use serde::{Deserialize, Serialize};

use crate::core::types::DocId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32, // term occurrences in the document
}

/// Posting list for a term.
/// Note: sorted by doc_id, at most one posting per document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn upsert(&mut self, posting: Posting) {
        // Keep sorted by doc_id for deterministic iteration
        match self
            .postings
            .binary_search_by(|p| p.doc_id.cmp(&posting.doc_id))
        {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    pub fn remove(&mut self, doc_id: &DocId) {
        if let Ok(pos) = self.postings.binary_search_by(|p| p.doc_id.cmp(doc_id)) {
            self.postings.remove(pos);
        }
    }

    pub fn get(&self, doc_id: &DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by(|p| p.doc_id.cmp(doc_id))
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }
}
