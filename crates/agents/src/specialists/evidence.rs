//! Guideline evidence specialist.

use async_trait::async_trait;
use clinmesh_core::error::AgentError;
use clinmesh_core::retrieval::Retriever;
use clinmesh_core::{AgentResponse, AgentRole, ClinicalAgent, PatientContext};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Surfaces guideline evidence for the query. Terminal agent.
///
/// Without a retriever it echoes a templated reference line, which keeps
/// the chain runnable in deployments with no evidence corpus.
pub struct EvidenceAgent {
    retriever: Option<Arc<dyn Retriever>>,
    top_k: usize,
}

impl EvidenceAgent {
    pub fn new() -> Self {
        Self {
            retriever: None,
            top_k: 3,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    async fn lookup(&self, query: &str) -> String {
        let Some(retriever) = &self.retriever else {
            return format!("Evidence-based guidelines for: {query}");
        };

        match retriever.retrieve(query, self.top_k).await {
            Ok(results) if !results.is_empty() => {
                let mut output = String::new();
                for evidence in &results {
                    let _ = writeln!(
                        output,
                        "[{}] ({:.0}% relevant) {}",
                        evidence.source,
                        evidence.relevance * 100.0,
                        evidence.content
                    );
                }
                output
            }
            Ok(_) => format!("No guideline evidence found for: {query}"),
            Err(e) => {
                debug!(error = %e, "Evidence retrieval failed, falling back to template");
                format!("Evidence-based guidelines for: {query}")
            }
        }
    }
}

impl Default for EvidenceAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClinicalAgent for EvidenceAgent {
    fn role(&self) -> AgentRole {
        AgentRole::EvidenceLookup
    }

    async fn process(
        &self,
        query: &str,
        _context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        Ok(AgentResponse {
            agent: self.role(),
            output: self.lookup(query).await,
            confidence: 0.9,
            reasoning: "Retrieved evidence from medical guidelines.".into(),
            next_agents: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinmesh_retrieval::EvidenceStore;

    #[tokio::test]
    async fn without_retriever_echoes_template() {
        let response = EvidenceAgent::new()
            .process("malaria treatment", &PatientContext::default())
            .await
            .unwrap();

        assert_eq!(
            response.output,
            "Evidence-based guidelines for: malaria treatment"
        );
        assert!((response.confidence - 0.9).abs() < 1e-9);
        assert!(response.next_agents.is_empty());
    }

    #[tokio::test]
    async fn with_retriever_formats_results() {
        let store = EvidenceStore::with_default_guidelines().await;
        let agent = EvidenceAgent::new().with_retriever(Arc::new(store));

        let response = agent
            .process("malaria fever treatment", &PatientContext::default())
            .await
            .unwrap();

        assert!(response.output.contains("WHO_Malaria_2023"));
        assert!(response.output.contains("artemisinin"));
    }

    #[tokio::test]
    async fn empty_corpus_reports_no_evidence() {
        let agent = EvidenceAgent::new().with_retriever(Arc::new(EvidenceStore::new()));
        let response = agent
            .process("rare syndrome", &PatientContext::default())
            .await
            .unwrap();
        assert!(response.output.starts_with("No guideline evidence found"));
    }
}
