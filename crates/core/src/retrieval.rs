//! Retriever trait — the abstraction over evidence lookup backends.
//!
//! The evidence agent delegates here when a backend is wired in; the
//! standalone chain runs without one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// A single retrieved piece of evidence, ranked by relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedEvidence {
    /// The evidence text (guideline excerpt, literature summary).
    pub content: String,

    /// Source identifier (e.g. "WHO_Malaria_2023").
    pub source: String,

    /// Relevance score in [0, 1], higher is better.
    pub relevance: f64,
}

/// The retrieval trait implemented by evidence backends.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// A human-readable backend name (e.g. "in_memory").
    fn name(&self) -> &str;

    /// Return up to `top_k` pieces of evidence ranked by relevance.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedEvidence>, RetrievalError>;
}
