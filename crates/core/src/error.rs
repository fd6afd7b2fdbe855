//! Error types for the ClinMesh domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all ClinMesh operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Knowledge base errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Evidence retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Inference errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Feedback persistence errors ---
    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failure of a specialist during `process`. An unknown nominated role
/// is not an error; the orchestrator skips it.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Agent {role} failed: {reason}")]
    ProcessFailed { role: String, reason: String },
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid knowledge table: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Retrieval backend unavailable: {0}")]
    Unavailable(String),

    #[error("Retrieval query failed: {0}")]
    QueryFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generation backend not configured: {0}")]
    NotConfigured(String),

    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_error_displays_correctly() {
        let err = Error::Agent(AgentError::ProcessFailed {
            role: "safety_monitor".into(),
            reason: "lookup table missing".into(),
        });
        assert!(err.to_string().contains("safety_monitor"));
        assert!(err.to_string().contains("lookup table missing"));
    }

    #[test]
    fn generation_error_displays_correctly() {
        let err = Error::Generation(GenerationError::Timeout { timeout_secs: 30 });
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn backend_seam_errors_display_their_cause() {
        // Variants reserved for external backends behind the Retriever
        // and Generator traits.
        let err = Error::Retrieval(RetrievalError::Unavailable("index offline".into()));
        assert!(err.to_string().contains("index offline"));

        let err = Error::Generation(GenerationError::NotConfigured("no model path".into()));
        assert!(err.to_string().contains("no model path"));
    }
}
