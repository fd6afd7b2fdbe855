//! Clinical knowledge tables for ClinMesh.
//!
//! Two immutable lookup structures loaded once at startup:
//! - [`DiagnosisLibrary`] — symptom/finding profiles with prior weights,
//!   consumed by the diagnostician agent
//! - [`DrugDatabase`] — drug-drug interactions, drug-condition
//!   contraindications, adverse events, allergy cross-reactivity classes,
//!   and pregnancy categories, consumed by the safety layer
//!
//! Both ship with compiled-in defaults and can be substituted from TOML,
//! so tests and deployments inject their own tables instead of patching
//! hard-coded globals.

pub mod drugs;
pub mod profiles;

pub use drugs::{AdverseEvent, Contraindication, DrugDatabase, Interaction, Severity};
pub use profiles::{DiagnosisLibrary, DiagnosisProfile};

use clinmesh_core::error::KnowledgeError;
use std::path::Path;

/// Read and parse a TOML knowledge file.
pub(crate) fn read_toml<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, KnowledgeError> {
    let text = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    toml::from_str(&text).map_err(|e| KnowledgeError::Invalid(e.to_string()))
}
