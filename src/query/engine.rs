use std::sync::Arc;

use tracing::debug;

use crate::analysis::tokenizer::Tokenizer;
use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::index::handle::SearchIndex;
use crate::index::inverted::Term;

/// Query-side boundary: tokenizes with the index's own tokenizer so the
/// two paths can never disagree on normalization, then delegates lookup
/// and ranking to the index.
pub struct QueryEngine {
    index: Arc<SearchIndex>,
    max_top_k: usize,
}

impl QueryEngine {
    pub fn new(index: Arc<SearchIndex>, max_top_k: usize) -> Self {
        QueryEngine { index, max_top_k }
    }

    /// Ranked document ids for a free-text query. A query that normalizes
    /// to zero terms (blank or punctuation-only) is a validation error;
    /// a query that matches nothing is an empty list.
    pub fn search(&self, query_str: &str, top_k: usize) -> Result<Vec<DocId>> {
        let terms: Vec<Term> = self
            .index
            .tokenizer()
            .tokenize(query_str)
            .into_iter()
            .map(|t| Term(t.text))
            .collect();

        if terms.is_empty() {
            return Err(Error::validation("query contains no searchable terms"));
        }

        let top_k = top_k.min(self.max_top_k);
        let hits = self.index.query(&terms, top_k);
        debug!(query = query_str, hits = hits.len(), "query executed");

        Ok(hits.into_iter().map(|h| h.doc_id).collect())
    }
}
