//! Hand-written agent doubles for orchestrator tests.

use async_trait::async_trait;
use clinmesh_core::error::AgentError;
use clinmesh_core::{AgentResponse, AgentRole, ClinicalAgent, PatientContext};

/// Returns a fixed successor list every round.
pub struct ScriptedAgent {
    role: AgentRole,
    next_agents: Vec<AgentRole>,
}

impl ScriptedAgent {
    pub fn new(role: AgentRole, next_agents: Vec<AgentRole>) -> Self {
        Self { role, next_agents }
    }
}

#[async_trait]
impl ClinicalAgent for ScriptedAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn process(
        &self,
        query: &str,
        _context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        Ok(AgentResponse {
            agent: self.role,
            output: format!("{} handled: {query}", self.role),
            confidence: 1.0,
            reasoning: "scripted".into(),
            next_agents: self.next_agents.clone(),
        })
    }
}

/// Always fails, for skip-and-continue tests.
pub struct FailingAgent {
    role: AgentRole,
}

impl FailingAgent {
    pub fn new(role: AgentRole) -> Self {
        Self { role }
    }
}

#[async_trait]
impl ClinicalAgent for FailingAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn process(
        &self,
        _query: &str,
        _context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        Err(AgentError::ProcessFailed {
            role: self.role.to_string(),
            reason: "injected failure".into(),
        })
    }
}
