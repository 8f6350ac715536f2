use crate::index::posting::Posting;

/// Scorer trait
pub trait Scorer: Send + Sync {
    /// Relevance contribution of one matched term in one document.
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32;

    fn name(&self) -> &str;
}

/// Document statistics for scoring
#[derive(Debug, Clone)]
pub struct DocStats {
    pub doc_length: usize,   // tokens in document
    pub avg_doc_length: f32, // average document length in the corpus
}

/// TF-IDF Scorer
pub struct TfIdfScorer {
    pub normalize: bool,
}

impl TfIdfScorer {
    pub fn new(normalize: bool) -> Self {
        TfIdfScorer { normalize }
    }
}

impl Scorer for TfIdfScorer {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32 {
        let tf = if self.normalize && doc_stats.doc_length > 0 {
            posting.term_freq as f32 / doc_stats.doc_length as f32
        } else {
            posting.term_freq as f32
        };

        tf * idf
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

/// BM25 Scorer
pub struct Bm25Scorer {
    pub k1: f32, // term frequency saturation
    pub b: f32,  // length normalization strength
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Bm25Scorer { k1: 1.2, b: 0.75 }
    }
}

impl Scorer for Bm25Scorer {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32 {
        let tf = posting.term_freq as f32;
        let doc_len = doc_stats.doc_length as f32;
        let avg_doc_len = if doc_stats.avg_doc_length > 0.0 {
            doc_stats.avg_doc_length
        } else {
            1.0
        };

        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_len / avg_doc_len));

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
