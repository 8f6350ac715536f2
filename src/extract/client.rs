use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{Error, Result};

/// External collaborator converting PDF bytes to plain text. Blocking
/// call; may fail. Behind a trait so tests swap in deterministic fakes.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

/// HTTP client for the extraction sidecar: POSTs the raw PDF body and
/// expects `{ "text": ... }` back. Carries an explicit request timeout so
/// a stuck sidecar suspends only the calling worker, bounded.
pub struct HttpTextExtractor {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTextExtractor {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::extraction(format!("cannot build HTTP client: {}", e)))?;

        Ok(HttpTextExtractor { endpoint, client })
    }
}

impl TextExtractor for HttpTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(bytes.to_vec())
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::extraction(format!(
                "extraction service returned {}: {}",
                status, body
            )));
        }

        let parsed: ExtractResponse = response.json()?;
        Ok(parsed.text)
    }
}

/// Deterministic extractors for tests and local development.
pub mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed text for every document.
    pub struct FixedExtractor(pub String);

    impl TextExtractor for FixedExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// Interprets the stored bytes themselves as the extracted text, so
    /// tests control per-document content.
    pub struct EchoExtractor;

    impl TextExtractor for EchoExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<String> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// Always fails, counting calls.
    pub struct FailingExtractor {
        pub calls: AtomicUsize,
    }

    impl FailingExtractor {
        pub fn new() -> Self {
            FailingExtractor {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextExtractor for FailingExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::extraction("extraction service unavailable"))
        }
    }
}
