//! Agent identity and response types.
//!
//! `AgentRole` is a closed set: it doubles as a routing key in the
//! orchestrator's registry and as the map key of a chain result. New
//! specialties are added here, not by open-ended subclassing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The specialties a clinical agent can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Differential diagnosis from symptoms and findings.
    Diagnostician,
    /// Contraindication, interaction, and allergy screening.
    SafetyMonitor,
    /// SOAP note generation.
    Documentation,
    /// Guideline and literature lookup.
    EvidenceLookup,
    /// Reserved routing key — no specialist is registered behind it.
    Coordinator,
}

impl AgentRole {
    /// The string key this role uses in chain results and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Diagnostician => "diagnostician",
            AgentRole::SafetyMonitor => "safety_monitor",
            AgentRole::Documentation => "documentation",
            AgentRole::EvidenceLookup => "evidence_lookup",
            AgentRole::Coordinator => "coordinator",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diagnostician" => Ok(AgentRole::Diagnostician),
            "safety_monitor" => Ok(AgentRole::SafetyMonitor),
            "documentation" => Ok(AgentRole::Documentation),
            "evidence_lookup" => Ok(AgentRole::EvidenceLookup),
            "coordinator" => Ok(AgentRole::Coordinator),
            other => Err(format!("Unknown agent role: {other}")),
        }
    }
}

/// The structured result of one agent invocation.
///
/// Created fresh on every `process` call and never mutated afterwards.
/// `next_agents` is consumed by the orchestrator and does not appear in
/// chain results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Which agent produced this response.
    pub agent: AgentRole,

    /// Free-text result (differential list, safety report, SOAP note, ...).
    pub output: String,

    /// Confidence in [0, 1]; semantics vary by agent.
    pub confidence: f64,

    /// One-line justification of how the output was produced.
    pub reasoning: String,

    /// Agents the producer recommends consulting next; empty is terminal.
    #[serde(default)]
    pub next_agents: Vec<AgentRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            AgentRole::Diagnostician,
            AgentRole::SafetyMonitor,
            AgentRole::Documentation,
            AgentRole::EvidenceLookup,
            AgentRole::Coordinator,
        ] {
            assert_eq!(role.as_str().parse::<AgentRole>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("pharmacist".parse::<AgentRole>().is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&AgentRole::SafetyMonitor).unwrap();
        assert_eq!(json, "\"safety_monitor\"");
    }

    #[test]
    fn response_serialization() {
        let response = AgentResponse {
            agent: AgentRole::Diagnostician,
            output: "DIFFERENTIAL DIAGNOSES:\n1. Pneumonia: 63.3%\n".into(),
            confidence: 0.633,
            reasoning: "Analyzed 3 symptoms and 2 findings.".into(),
            next_agents: vec![AgentRole::SafetyMonitor, AgentRole::EvidenceLookup],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("diagnostician"));
        assert!(json.contains("safety_monitor"));

        let back: AgentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next_agents.len(), 2);
    }
}
