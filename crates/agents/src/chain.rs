//! Round-based multi-agent reasoning chain.
//!
//! The orchestrator seeds the active set with the diagnostician and runs
//! rounds until no agent nominates a successor or the round cap is hit.
//! Every agent in a round sees the same query and context; successor
//! nominations are merged at the end of the round, deduplicated in
//! first-nomination order so execution is deterministic.

use clinmesh_core::{AgentRole, ClinicalAgent, PatientContext};
use clinmesh_knowledge::{DiagnosisLibrary, DrugDatabase};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::specialists::{
    Diagnostician, DocumentationAgent, EvidenceAgent, SafetyMonitorAgent,
};

/// One agent's recorded contribution to a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentVerdict {
    pub output: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// The outcome of a full reasoning chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainResult {
    /// Latest verdict per role key. A role that ran in several rounds
    /// keeps only its last verdict.
    pub verdicts: HashMap<String, AgentVerdict>,
    /// Number of rounds executed.
    pub rounds: usize,
}

impl ChainResult {
    pub fn verdict(&self, role: AgentRole) -> Option<&AgentVerdict> {
        self.verdicts.get(role.as_str())
    }
}

/// Dispatches specialist agents in rounds.
pub struct AgentOrchestrator {
    agents: HashMap<AgentRole, Arc<dyn ClinicalAgent>>,
    max_rounds: usize,
}

impl AgentOrchestrator {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            max_rounds: 10,
        }
    }

    /// An orchestrator wired with the four default specialists over the
    /// built-in knowledge tables. No evidence retriever is attached.
    pub fn with_default_agents() -> Self {
        Self::new()
            .register(Arc::new(Diagnostician::new(Arc::new(
                DiagnosisLibrary::default(),
            ))))
            .register(Arc::new(SafetyMonitorAgent::new(Arc::new(
                DrugDatabase::default(),
            ))))
            .register(Arc::new(DocumentationAgent::new()))
            .register(Arc::new(EvidenceAgent::new()))
    }

    /// Register an agent under its own role.
    pub fn register(mut self, agent: Arc<dyn ClinicalAgent>) -> Self {
        self.agents.insert(agent.role(), agent);
        self
    }

    /// Cap the number of rounds. Cyclic nomination graphs terminate here.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Run the reasoning chain for one query.
    ///
    /// An unregistered nominated role is skipped with a warning, as is an
    /// agent that returns an error; either way the verdicts gathered so
    /// far are preserved.
    pub async fn run_reasoning_chain(
        &self,
        query: &str,
        context: &PatientContext,
    ) -> ChainResult {
        let mut result = ChainResult::default();
        let mut active: Vec<AgentRole> = vec![AgentRole::Diagnostician];

        info!(query, "Starting agent reasoning chain");

        while !active.is_empty() && result.rounds < self.max_rounds {
            result.rounds += 1;
            let mut nominated: Vec<AgentRole> = Vec::new();

            for role in &active {
                let Some(agent) = self.agents.get(role) else {
                    warn!(role = %role, "Agent not registered, skipping");
                    continue;
                };

                match agent.process(query, context).await {
                    Ok(response) => {
                        info!(
                            role = %role,
                            confidence = format!("{:.1}%", response.confidence * 100.0),
                            "Agent completed"
                        );
                        result.verdicts.insert(
                            role.as_str().to_string(),
                            AgentVerdict {
                                output: response.output,
                                confidence: response.confidence,
                                reasoning: response.reasoning,
                            },
                        );
                        nominated.extend(response.next_agents);
                    }
                    Err(e) => {
                        warn!(role = %role, error = %e, "Agent failed, skipping");
                    }
                }
            }

            active = dedup_preserving_order(nominated);
        }

        info!(rounds = result.rounds, "Reasoning chain completed");
        result
    }

    /// Render the chain result as one plain-text report, sections in
    /// fixed role order.
    pub fn format_final_report(&self, result: &ChainResult) -> String {
        let mut report = String::from("COMPREHENSIVE CLINICAL ASSESSMENT\n");
        report.push_str(&"=".repeat(60));
        report.push_str("\n\n");

        for role in [
            AgentRole::Diagnostician,
            AgentRole::SafetyMonitor,
            AgentRole::Documentation,
        ] {
            if let Some(verdict) = result.verdict(role) {
                report.push_str(&verdict.output);
                report.push('\n');
            }
        }

        if let Some(verdict) = result.verdict(AgentRole::EvidenceLookup) {
            report.push_str("EVIDENCE & GUIDELINES:\n");
            report.push_str(&verdict.output);
            report.push('\n');
        }

        report
    }
}

impl Default for AgentOrchestrator {
    fn default() -> Self {
        Self::with_default_agents()
    }
}

/// First-nomination order, duplicates dropped.
fn dedup_preserving_order(roles: Vec<AgentRole>) -> Vec<AgentRole> {
    let mut seen = HashSet::new();
    roles.into_iter().filter(|r| seen.insert(*r)).collect()
}
