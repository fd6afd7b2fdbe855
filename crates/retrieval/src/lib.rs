//! Evidence retrieval for ClinMesh.
//!
//! The in-memory [`EvidenceStore`] ranks guideline documents by keyword
//! overlap with the query. It is the default backend behind the evidence
//! agent; a vector-search backend would implement the same
//! [`Retriever`] trait.

use async_trait::async_trait;
use clinmesh_core::error::RetrievalError;
use clinmesh_core::retrieval::{RetrievedEvidence, Retriever};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A guideline document held by the store.
#[derive(Debug, Clone)]
struct Document {
    content: String,
    source: String,
}

/// An in-memory keyword-ranked evidence store.
pub struct EvidenceStore {
    documents: Arc<RwLock<Vec<Document>>>,
    /// Minimum relevance for a document to be returned.
    min_relevance: f64,
}

impl EvidenceStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            min_relevance: 0.3,
        }
    }

    /// Override the relevance threshold.
    pub fn with_min_relevance(mut self, min_relevance: f64) -> Self {
        self.min_relevance = min_relevance;
        self
    }

    /// A store seeded with the built-in guideline snippets.
    pub async fn with_default_guidelines() -> Self {
        let store = Self::new();
        for (content, source) in DEFAULT_GUIDELINES {
            store.add_document(content, source).await;
        }
        store
    }

    /// Add a document to the store.
    pub async fn add_document(&self, content: &str, source: &str) {
        self.documents.write().await.push(Document {
            content: content.into(),
            source: source.into(),
        });
        debug!(source, "Added evidence document");
    }

    /// Number of documents held.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Keyword-overlap relevance: fraction of query tokens present in the
    /// document, case-insensitive. Tokens shorter than 3 characters are
    /// ignored so "of"/"in" don't inflate scores.
    fn relevance(query_tokens: &[String], content: &str) -> f64 {
        if query_tokens.is_empty() {
            return 0.0;
        }
        let content_lower = content.to_lowercase();
        let hits = query_tokens
            .iter()
            .filter(|t| content_lower.contains(t.as_str()))
            .count();
        hits as f64 / query_tokens.len() as f64
    }

    fn tokenize(query: &str) -> Vec<String> {
        query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 3)
            .map(String::from)
            .collect()
    }
}

impl Default for EvidenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for EvidenceStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedEvidence>, RetrievalError> {
        let tokens = Self::tokenize(query);
        let documents = self.documents.read().await;

        let mut results: Vec<RetrievedEvidence> = documents
            .iter()
            .map(|doc| RetrievedEvidence {
                content: doc.content.clone(),
                source: doc.source.clone(),
                relevance: Self::relevance(&tokens, &doc.content),
            })
            .filter(|e| e.relevance >= self.min_relevance)
            .collect();

        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!(query, results = results.len(), "Evidence retrieval");
        Ok(results)
    }
}

/// Built-in guideline snippets for the standalone deployment.
const DEFAULT_GUIDELINES: &[(&str, &str)] = &[
    (
        "Community-acquired pneumonia: first-line empiric therapy for outpatients \
         without comorbidities is amoxicillin; assess severity with CURB-65 and \
         obtain a chest radiograph to confirm infiltrate.",
        "ATS_CAP_2019",
    ),
    (
        "Uncomplicated malaria: artemisinin-based combination therapy is the \
         recommended first-line treatment; confirm diagnosis by microscopy or \
         rapid diagnostic test before treating fever empirically.",
        "WHO_Malaria_2023",
    ),
    (
        "Pulmonary tuberculosis: suspect in patients with chronic cough over two \
         weeks, fever, night sweats, or weight loss; obtain sputum for Xpert \
         MTB/RIF before starting therapy.",
        "WHO_TB_2022",
    ),
    (
        "Seasonal influenza: antiviral treatment with a neuraminidase inhibitor is \
         most effective when started within 48 hours of symptom onset in \
         high-risk patients.",
        "CDC_Influenza_2023",
    ),
    (
        "Acute bronchitis: routine antibiotic therapy is not recommended for \
         otherwise healthy adults; cough may persist up to three weeks.",
        "NICE_Bronchitis_2019",
    ),
];
