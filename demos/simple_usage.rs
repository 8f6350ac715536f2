/// PDF search service demo
///
/// Runs the full boundary against an in-process extractor (no sidecar
/// needed): ingest a few documents, fetch one back, search, and show the
/// degraded path for a rejected upload.
use std::sync::Arc;

use pdfsearch::core::config::Config;
use pdfsearch::extract::client::fakes::EchoExtractor;
use pdfsearch::service::SearchService;
use pdfsearch::storage::blob::{BlobStore, FsBlobStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let dir = tempfile::tempdir()?;
    let config = Config {
        blob_dir: dir.path().join("pdfs"),
        index_dir: dir.path().join("index"),
        ..Config::default()
    };

    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::open(config.blob_dir.clone())?);
    let service = SearchService::with_collaborators(blobs, Arc::new(EchoExtractor), &config)?;

    println!("Ingesting documents...");
    let report = service.ingest(b"annual revenue growth exceeded forecasts", "report.pdf")?;
    let memo = service.ingest(b"internal memo about revenue recognition", "memo.pdf")?;
    let notes = service.ingest(b"meeting notes unrelated to finance", "notes.pdf")?;
    println!("  report -> {} ({:?})", report.id, report.stage);
    println!("  memo   -> {} ({:?})", memo.id, memo.stage);
    println!("  notes  -> {} ({:?})", notes.id, notes.stage);

    println!("\nFetching report bytes...");
    let bytes = service.fetch(&report.id)?;
    println!("  {} bytes", bytes.len());

    println!("\nSearching...");
    for query in ["revenue", "forecasts", "nonexistentword"] {
        let ids = service.search(query)?;
        println!("  {:?}: {}", query, serde_json::to_string(&ids)?);
    }

    println!("\nRejected upload:");
    match service.ingest(b"not a pdf", "malware.exe") {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(e) => println!("  {}", e),
    }

    service.close()?;
    Ok(())
}
