//! # ClinMesh Core
//!
//! Domain types, traits, and error definitions for the ClinMesh clinical
//! reasoning runtime. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping knowledge tables and retrieval backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod context;
pub mod error;
pub mod generation;
pub mod retrieval;
pub mod role;

// Re-export key types at crate root for ergonomics
pub use agent::ClinicalAgent;
pub use context::PatientContext;
pub use error::{Error, Result};
pub use generation::{GenerationRequest, GenerationResponse, Generator};
pub use retrieval::{RetrievedEvidence, Retriever};
pub use role::{AgentResponse, AgentRole};
