//! Patient context — the shared, read-only input to a reasoning chain.
//!
//! Every field the agents consult is either a `Vec` that defaults to empty
//! or an `Option`, so a partially populated context is always well-formed.
//! Agents receive the context by shared reference and must not mutate it.

use serde::{Deserialize, Serialize};

/// Patient information passed through one chain execution.
///
/// Constructed by the caller, never persisted by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientContext {
    /// Age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Free-text gender marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Reported symptoms (e.g. "fever", "productive cough").
    #[serde(default)]
    pub symptoms: Vec<String>,

    /// Clinical exam findings (e.g. "crackles RLL", "SpO2 95%").
    #[serde(default)]
    pub findings: Vec<String>,

    /// Known allergies.
    #[serde(default)]
    pub allergies: Vec<String>,

    /// Current medications.
    #[serde(default)]
    pub medications: Vec<String>,

    /// Declared contraindications.
    #[serde(default)]
    pub contraindications: Vec<String>,

    /// Red-flag observations requiring escalation.
    #[serde(default)]
    pub red_flags: Vec<String>,

    /// Working diagnosis, if one has been established.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    /// Ordered diagnostic tests.
    #[serde(default)]
    pub tests: Vec<String>,

    /// Treatment plan text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl PatientContext {
    /// Whether the patient is pregnant, as declared via red flags.
    ///
    /// The intake form records pregnancy as a red-flag entry rather than a
    /// dedicated field.
    pub fn is_pregnant(&self) -> bool {
        self.red_flags
            .iter()
            .any(|f| f.to_lowercase().contains("pregnan"))
    }
}
