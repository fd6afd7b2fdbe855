//! Medication safety checking for ClinMesh.
//!
//! Two independent layers:
//! - [`InteractionChecker`] — queries the drug database for drug-drug
//!   interactions, contraindications, allergy conflicts, adverse events,
//!   and pregnancy safety, and assembles a [`SafetyCheck`] report
//! - [`OutputRiskScreen`] — rule-based screening of generated text for
//!   content that must never reach a patient unreviewed (explicit dosing,
//!   definitive diagnoses, direct medical advice)

pub mod checker;
pub mod rules;

pub use checker::{AllergyConflict, InteractionChecker, PregnancyNote, SafetyCheck};
pub use rules::{OutputRiskScreen, RiskAssessment};
