//! Diagnosis symptom profiles.
//!
//! Each profile pairs a diagnosis with the symptom and finding keywords
//! expected for it, plus a prior weight. The library preserves declaration
//! order: when two candidates tie on confidence, the first-declared
//! diagnosis wins.

use clinmesh_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Expected presentation of one diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisProfile {
    /// Diagnosis name (e.g. "Pneumonia").
    pub name: String,

    /// Symptom keywords matched against lowercased context symptoms.
    #[serde(default)]
    pub symptoms: Vec<String>,

    /// Finding keywords matched against lowercased context findings.
    #[serde(default)]
    pub findings: Vec<String>,

    /// Prior weight in [0, 1].
    pub weight: f64,
}

/// An ordered collection of diagnosis profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisLibrary {
    #[serde(rename = "diagnoses")]
    profiles: Vec<DiagnosisProfile>,
}

impl DiagnosisLibrary {
    /// Build a library from an explicit profile list, preserving order.
    pub fn new(profiles: Vec<DiagnosisProfile>) -> Self {
        Self { profiles }
    }

    /// Load a library from a TOML file.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let library: Self = crate::read_toml(path)?;
        library.validate()?;
        info!(
            profiles = library.profiles.len(),
            "Loaded diagnosis library from {}",
            path.display()
        );
        Ok(library)
    }

    /// Parse a library from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, KnowledgeError> {
        let library: Self =
            toml::from_str(text).map_err(|e| KnowledgeError::Invalid(e.to_string()))?;
        library.validate()?;
        Ok(library)
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        for profile in &self.profiles {
            if !(0.0..=1.0).contains(&profile.weight) {
                return Err(KnowledgeError::Invalid(format!(
                    "Profile '{}' has weight {} outside [0, 1]",
                    profile.name, profile.weight
                )));
            }
        }
        Ok(())
    }

    /// Iterate profiles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosisProfile> {
        self.profiles.iter()
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for DiagnosisLibrary {
    /// The built-in respiratory/febrile illness profiles.
    fn default() -> Self {
        fn profile(name: &str, symptoms: &[&str], findings: &[&str], weight: f64) -> DiagnosisProfile {
            DiagnosisProfile {
                name: name.into(),
                symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
                findings: findings.iter().map(|s| s.to_string()).collect(),
                weight,
            }
        }

        Self::new(vec![
            profile(
                "Pneumonia",
                &["fever", "cough", "dyspnea"],
                &["crackles", "consolidation"],
                0.95,
            ),
            profile("Bronchitis", &["cough", "dyspnea"], &["wheezing"], 0.75),
            profile(
                "Malaria",
                &["fever", "chills", "headache"],
                &["anemia"],
                0.90,
            ),
            profile(
                "Tuberculosis",
                &["chronic_cough", "fever", "weight_loss"],
                &["infiltrates"],
                0.92,
            ),
            profile(
                "Influenza",
                &["fever", "cough", "myalgia"],
                &["normal_cxr"],
                0.70,
            ),
            profile(
                "COVID-19",
                &["fever", "cough", "dyspnea"],
                &["ground_glass"],
                0.88,
            ),
        ])
    }
}
