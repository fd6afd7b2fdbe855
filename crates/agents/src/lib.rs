//! Specialist clinical agents and the reasoning-chain orchestrator.
//!
//! Four specialists cooperate on each query:
//!
//! 1. **Diagnostician** — ranks differential diagnoses against a symptom
//!    profile library
//! 2. **SafetyMonitor** — screens the proposed treatment against
//!    medications, allergies, and contraindications
//! 3. **Documentation** — renders a SOAP note from the patient context
//! 4. **EvidenceLookup** — surfaces guideline evidence for the query
//!
//! The [`AgentOrchestrator`] runs them in rounds: each agent nominates
//! its successors, nominations are merged at a round barrier, and the
//! chain ends when no agent nominates anyone or the round cap is hit.

pub mod chain;
pub mod specialists;

pub use chain::{AgentOrchestrator, AgentVerdict, ChainResult};
pub use specialists::{
    Diagnostician, DocumentationAgent, EvidenceAgent, SafetyMonitorAgent,
};

#[cfg(test)]
pub(crate) mod test_helpers;
