//! ClinicalAgent trait — the abstraction over specialist reasoning units.
//!
//! An agent is a stateless (per-call) transformer from a query plus shared
//! patient context to a structured response naming its successors. Agents
//! must tolerate any well-formed `PatientContext`, including one with every
//! collection empty; the `Result` exists so the orchestrator can isolate a
//! faulty implementation without aborting the whole chain.

use async_trait::async_trait;
use crate::context::PatientContext;
use crate::error::AgentError;
use crate::role::{AgentResponse, AgentRole};

/// The core agent trait.
///
/// Each specialist (diagnostician, safety monitor, documentation, evidence
/// lookup) implements this trait and is registered with the orchestrator
/// under its role.
#[async_trait]
pub trait ClinicalAgent: Send + Sync {
    /// The role this agent is registered under.
    fn role(&self) -> AgentRole;

    /// Process one query against the shared patient context.
    ///
    /// Must not mutate `context` or depend on another agent's prior output.
    async fn process(
        &self,
        query: &str,
        context: &PatientContext,
    ) -> std::result::Result<AgentResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAgent;

    #[async_trait]
    impl ClinicalAgent for FixedAgent {
        fn role(&self) -> AgentRole {
            AgentRole::EvidenceLookup
        }

        async fn process(
            &self,
            query: &str,
            _context: &PatientContext,
        ) -> std::result::Result<AgentResponse, AgentError> {
            Ok(AgentResponse {
                agent: self.role(),
                output: format!("echo: {query}"),
                confidence: 0.9,
                reasoning: "fixed".into(),
                next_agents: vec![],
            })
        }
    }

    #[tokio::test]
    async fn trait_object_dispatch() {
        let agent: Box<dyn ClinicalAgent> = Box::new(FixedAgent);
        let response = agent
            .process("community acquired pneumonia", &PatientContext::default())
            .await
            .unwrap();
        assert_eq!(response.agent, AgentRole::EvidenceLookup);
        assert!(response.output.contains("pneumonia"));
    }
}
