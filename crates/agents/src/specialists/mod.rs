//! The four specialist agents.
//!
//! Each implements [`clinmesh_core::ClinicalAgent`] and is pure over its
//! inputs; injected knowledge (diagnosis library, drug database, evidence
//! retriever) is shared behind `Arc` and never mutated.

pub mod diagnostician;
pub mod documentation;
pub mod evidence;
pub mod safety_monitor;

pub use diagnostician::Diagnostician;
pub use documentation::DocumentationAgent;
pub use evidence::EvidenceAgent;
pub use safety_monitor::SafetyMonitorAgent;
