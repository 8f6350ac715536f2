use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::core::types::DocId;
use crate::index::posting::{Posting, PostingList};

/// Term representation: a normalized token used as an index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term(pub String);

impl Term {
    pub fn new(text: &str) -> Self {
        Term(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// In-memory inverted index: term -> posting list, plus the per-document
/// bookkeeping needed for scoring and atomic re-indexing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub postings: HashMap<Term, PostingList>,
    /// Terms currently posted for each document, so an upsert can retract
    /// every prior posting before inserting the new set.
    pub doc_terms: HashMap<DocId, Vec<Term>>,
    /// Token count per document, for length normalization.
    pub doc_lengths: HashMap<DocId, usize>,
    /// Monotonic per-document counter, incremented on each successful re-index.
    pub versions: HashMap<DocId, u64>,
    pub total_tokens: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Replace all postings belonging to `doc_id` with postings derived
    /// from `tokens`. Callers hold the index write lock, so readers see
    /// either the old posting set or the new one, never a mix.
    pub fn upsert_document(&mut self, doc_id: DocId, tokens: &[Token]) {
        self.remove_document(&doc_id);

        let mut term_freqs: HashMap<Term, u32> = HashMap::new();
        for token in tokens {
            *term_freqs.entry(Term::new(&token.text)).or_insert(0) += 1;
        }

        let mut terms: Vec<Term> = term_freqs.keys().cloned().collect();
        terms.sort();

        for (term, freq) in term_freqs {
            self.postings.entry(term).or_default().upsert(Posting {
                doc_id: doc_id.clone(),
                term_freq: freq,
            });
        }

        self.total_tokens += tokens.len();
        self.doc_lengths.insert(doc_id.clone(), tokens.len());
        self.doc_terms.insert(doc_id.clone(), terms);
        *self.versions.entry(doc_id).or_insert(0) += 1;
    }

    fn remove_document(&mut self, doc_id: &DocId) {
        let Some(old_terms) = self.doc_terms.remove(doc_id) else {
            return;
        };
        for term in old_terms {
            if let Some(list) = self.postings.get_mut(&term) {
                list.remove(doc_id);
                if list.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
        if let Some(len) = self.doc_lengths.remove(doc_id) {
            self.total_tokens -= len;
        }
    }

    pub fn posting_list(&self, term: &Term) -> Option<&PostingList> {
        self.postings.get(term)
    }

    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn doc_length(&self, doc_id: &DocId) -> Option<usize> {
        self.doc_lengths.get(doc_id).copied()
    }

    pub fn version(&self, doc_id: &DocId) -> Option<u64> {
        self.versions.get(doc_id).copied()
    }

    pub fn avg_doc_length(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        self.total_tokens as f32 / self.doc_lengths.len() as f32
    }

    /// IDF = ln((N + 1) / (df + 1)), computed against the current corpus.
    pub fn idf(&self, term: &Term) -> f32 {
        let df = self
            .postings
            .get(term)
            .map(|l| l.doc_freq())
            .unwrap_or(0);
        ((self.doc_count() as f32 + 1.0) / (df as f32 + 1.0)).ln()
    }
}
