//! Document store
//!
//! Loads the source document once, caches its plain text for the process
//! lifetime and answers containment and chunking queries over it.

mod chunker;
mod pdf;

pub use chunker::{chunk_text, gather_relevant, TextChunk};
pub use pdf::extract_text_from_pdf;

use crate::errors::ResolveError;
use crate::metrics;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Where the document text comes from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A PDF decoded with lopdf
    Pdf(PathBuf),
    /// A UTF-8 text file
    Text(PathBuf),
    /// Text supplied directly
    Inline(String),
}

impl DocumentSource {
    /// Pick the source kind from the file extension; `.txt` and `.md` are
    /// read as text, everything else as PDF
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "txt" | "md"))
            .unwrap_or(false);

        if is_text {
            DocumentSource::Text(path.to_path_buf())
        } else {
            DocumentSource::Pdf(path.to_path_buf())
        }
    }

    /// Human-readable origin used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Pdf(path) | DocumentSource::Text(path) => path.display().to_string(),
            DocumentSource::Inline(_) => "<inline>".to_string(),
        }
    }

    async fn read(&self) -> Result<String, ResolveError> {
        let text = match self {
            DocumentSource::Pdf(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || extract_text_from_pdf(&path))
                    .await
                    .map_err(|e| ResolveError::Extraction {
                        path: self.describe(),
                        message: format!("PDF decoding task failed: {}", e),
                    })??
            }
            DocumentSource::Text(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ResolveError::Extraction {
                        path: self.describe(),
                        message: format!("Failed to read document: {}", e),
                    })?;
                pdf::clean_text(&raw)
            }
            DocumentSource::Inline(text) => text.clone(),
        };

        if text.trim().is_empty() {
            return Err(ResolveError::Extraction {
                path: self.describe(),
                message: "No text content in document".to_string(),
            });
        }

        Ok(text)
    }
}

/// Extracted document text, immutable once loaded
#[derive(Debug)]
pub struct Document {
    text: String,
    lowercase: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lowercase = text.to_lowercase();
        Self { text, lowercase }
    }

    /// The full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Case-insensitive substring test
    pub fn contains(&self, needle: &str) -> bool {
        self.lowercase.contains(&needle.to_lowercase())
    }

    /// Contiguous, non-overlapping chunks of at most `max_length` characters
    pub fn chunk(&self, max_length: usize) -> Vec<String> {
        chunk_text(&self.text, max_length)
            .into_iter()
            .map(|chunk| chunk.content.to_string())
            .collect()
    }

    /// Ordered concatenation of the chunks that mention `term`
    pub fn relevant_text(&self, term: &str, max_length: usize, lookahead: bool) -> String {
        gather_relevant(&self.text, term, max_length, lookahead)
    }
}

/// Lazily loaded, process-wide cache of the source document.
///
/// A failed load is not cached; the next caller tries again.
pub struct DocumentStore {
    source: DocumentSource,
    document: OnceCell<Document>,
}

impl DocumentStore {
    pub fn new(source: DocumentSource) -> Self {
        Self {
            source,
            document: OnceCell::new(),
        }
    }

    /// Store backed by in-memory text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(DocumentSource::Inline(text.into()))
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Whether the document has already been decoded
    pub fn is_loaded(&self) -> bool {
        self.document.initialized()
    }

    /// Decode the document on first use and return the cached text
    pub async fn load(&self) -> Result<&Document, ResolveError> {
        self.document
            .get_or_try_init(|| async {
                let start = Instant::now();
                match self.source.read().await {
                    Ok(text) => {
                        let elapsed = start.elapsed();
                        metrics::record_document_load(elapsed.as_secs_f64());
                        info!(
                            source = %self.source.describe(),
                            chars = text.chars().count(),
                            latency_ms = elapsed.as_millis() as u64,
                            "Document loaded"
                        );
                        Ok(Document::new(text))
                    }
                    Err(e) => {
                        warn!(source = %self.source.describe(), error = %e, "Document load failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Case-insensitive substring test over the document text
    pub async fn contains(&self, needle: &str) -> Result<bool, ResolveError> {
        Ok(self.load().await?.contains(needle))
    }

    /// Chunk the document text
    pub async fn chunk(&self, max_length: usize) -> Result<Vec<String>, ResolveError> {
        Ok(self.load().await?.chunk(max_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_extension() {
        assert!(matches!(DocumentSource::from_path("java.pdf"), DocumentSource::Pdf(_)));
        assert!(matches!(DocumentSource::from_path("notes.TXT"), DocumentSource::Text(_)));
        assert!(matches!(DocumentSource::from_path("README.md"), DocumentSource::Text(_)));
        assert!(matches!(DocumentSource::from_path("java"), DocumentSource::Pdf(_)));
    }

    #[tokio::test]
    async fn test_contains_is_case_insensitive() {
        let store = DocumentStore::from_text("Java was created in 1995.");
        assert!(store.contains("JAVA").await.unwrap());
        assert!(store.contains("created in").await.unwrap());
        assert!(!store.contains("Python").await.unwrap());
    }

    #[tokio::test]
    async fn test_chunk_round_trip() {
        let text = "Java was created in 1995. It runs on the JVM.";
        let store = DocumentStore::from_text(text);
        for len in [1, 5, 7, 150] {
            let chunks = store.chunk(len).await.unwrap();
            assert_eq!(chunks.concat(), text);
            assert_eq!(chunks, store.chunk(len).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let store = DocumentStore::from_text("Java");
        assert!(!store.is_loaded());
        let first = store.load().await.unwrap() as *const Document;
        let second = store.load().await.unwrap() as *const Document;
        assert!(store.is_loaded());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_document_fails() {
        let store = DocumentStore::from_text("   ");
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ResolveError::Extraction { .. }));
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_text_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.txt");
        std::fs::write(&path, "Threads   share\nmemory.").unwrap();

        let store = DocumentStore::new(DocumentSource::from_path(&path));
        assert_eq!(store.load().await.unwrap().text(), "Threads share memory.");
    }

    #[tokio::test]
    async fn test_missing_pdf_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("java.pdf");
        let store = DocumentStore::new(DocumentSource::Pdf(path));

        assert!(matches!(store.load().await, Err(ResolveError::Extraction { .. })));
        assert!(!store.is_loaded());
        assert!(store.contains("java").await.is_err());
    }
}
