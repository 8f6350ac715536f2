use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::types::DocId;

/// Document with relevance score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f32,
}

impl ScoredDocument {
    /// Ranking order: higher score first, ties broken by ascending doc id
    /// so a fixed index state always yields the same ordered list.
    fn ranks_above(&self, other: &Self) -> bool {
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => self.doc_id < other.doc_id,
        }
    }
}

impl PartialEq for ScoredDocument {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}

impl Eq for ScoredDocument {}

impl PartialOrd for ScoredDocument {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDocument {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap keeps the worst hit on top for eviction
        if self.ranks_above(other) {
            Ordering::Less
        } else if other.ranks_above(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Top-K collector for efficient result collection
pub struct TopKCollector {
    heap: BinaryHeap<ScoredDocument>,
    k: usize,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        TopKCollector {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
        }
    }

    pub fn collect(&mut self, scored_doc: ScoredDocument) {
        if self.k == 0 {
            return;
        }
        self.heap.push(scored_doc);
        if self.heap.len() > self.k {
            self.heap.pop(); // drops the lowest-ranked hit
        }
    }

    /// Best hits first.
    pub fn into_results(self) -> Vec<ScoredDocument> {
        self.heap.into_sorted_vec()
    }
}
