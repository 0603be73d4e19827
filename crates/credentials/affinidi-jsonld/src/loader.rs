//! Document loading seam for remote contexts and documents.
//!
//! The processor never performs I/O on its own. Anything that resolves a URL
//! (an HTTP client, a bundled set of contexts, a test fixture) implements
//! [DocumentLoader] and is handed over through the options.

use std::collections::HashMap;

use serde_json::Value;

/// A document returned by a [DocumentLoader].
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteDocument {
    /// Final URL of the document, after any redirects.
    pub document_url: String,
    /// Context advertised out of band (for example in an HTTP Link header).
    pub context_url: Option<String>,
    pub document: Value,
}

/// Errors a loader may report. They surface wrapped in
/// [`JsonLdError::LoadingFailed`](crate::error::JsonLdError::LoadingFailed).
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("no document loader configured")]
    NoLoader,

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Resolves URLs to JSON documents.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError>;
}

/// In-memory loader backed by a URL to document map.
#[derive(Clone, Debug, Default)]
pub struct StaticDocumentLoader {
    documents: HashMap<String, Value>,
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: &str, document: Value) {
        self.documents.insert(url.to_string(), document);
    }
}

impl DocumentLoader for StaticDocumentLoader {
    fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        let document = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(url.to_string()))?;
        tracing::trace!(url, "loaded static document");
        Ok(RemoteDocument {
            document_url: url.to_string(),
            context_url: None,
            document,
        })
    }
}
