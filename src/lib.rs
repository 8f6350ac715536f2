pub mod analysis;
pub mod core;
pub mod extract;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod scoring;
pub mod search;
pub mod service;
pub mod storage;

/*
┌──────────────────────────────────────────────────────────────────────────┐
│                        PDFSEARCH STRUCT ARCHITECTURE                      │
└──────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── BOUNDARY LAYER ─────────────────────────────┐
│                                                                           │
│  ┌─────────────────────────────────────────────────────────────────┐    │
│  │                      struct SearchService                        │    │
│  │  blobs: Arc<dyn BlobStore>       // raw PDF bytes by id          │    │
│  │  extractor: Arc<dyn TextExtractor> // PDF bytes -> plain text    │    │
│  │  index: Arc<SearchIndex>         // one shared persistent handle │    │
│  │  pipeline: IngestionPipeline     // store -> extract -> index    │    │
│  │  engine: QueryEngine             // tokenize -> lookup -> rank   │    │
│  └─────────────────────────────────────────────────────────────────┘    │
│                                                                           │
│  Operations: ingest / fetch / extract_on_demand / search                  │
└───────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── PIPELINE LAYER ─────────────────────────────┐
│                                                                           │
│  IngestionPipeline ──validates──> filename/.pdf, non-empty payload       │
│       │                                                                   │
│       ├──BlobStore.put──> DocId        (failure aborts the call)          │
│       ├──TextExtractor.extract──> text (failure degrades, logged)        │
│       └──SearchIndex.upsert──> postings (failure degrades, logged)       │
│                                                                           │
│  IngestReceipt { doc_id, stage: Stored -> Extracted -> Indexed,           │
│                  degraded: Option<Error> }                                │
└───────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── INDEXING LAYER ─────────────────────────────┐
│                                                                           │
│  ┌─────────────────────────────────────────────────────────────────┐    │
│  │                      struct SearchIndex                          │    │
│  │  tokenizer: StandardTokenizer    // shared by both paths         │    │
│  │  scorer: Box<dyn Scorer>         // BM25 by default              │    │
│  │  state: RwLock<IndexState>       // readers-writers discipline   │    │
│  │    IndexState { index: InvertedIndex, wal: Wal }                 │    │
│  └─────────────────────────────────────────────────────────────────┘    │
│                                                                           │
│  InvertedIndex ──contains──> PostingList ──contains──> Posting           │
│       │                                                                   │
│       └──tracks──> doc_terms / doc_lengths / versions                    │
│                                                                           │
│  Persistence: meta/checkpoint.bin (bincode snapshot)                      │
│               wal/wal_NNNNNNNN.log (len + crc32 + bincode entries)        │
└───────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────── SEARCH LAYER ───────────────────────────────┐
│                                                                           │
│  QueryEngine ──tokenizes with──> index tokenizer                          │
│       │                                                                   │
│       └──delegates──> SearchIndex.query ──collects──> TopKCollector       │
│                                                                           │
│  Ranking: sum of per-term Scorer weights; deterministic order,            │
│  ties broken by ascending document id                                     │
└───────────────────────────────────────────────────────────────────────────┘
*/
