//! Drug safety tables.
//!
//! The [`DrugDatabase`] bundles five lookup structures: drug-drug
//! interactions (unordered pair keyed), drug-condition contraindications,
//! known adverse events, allergy cross-reactivity classes, and pregnancy
//! categories. All matching is case-insensitive; the checker in
//! `clinmesh-safety` drives the queries.

use clinmesh_core::error::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Severity of an interaction or contraindication.
///
/// Declaration order defines the sort order: `Critical` ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Major,
    Moderate,
    Minor,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Moderate => "MODERATE",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// A known drug-drug interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub mechanism: String,
    pub recommendation: String,
}

/// A drug-condition contraindication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contraindication {
    pub drug: String,
    pub condition: String,
    pub severity: Severity,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

/// A known adverse event for a medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdverseEvent {
    pub drug: String,
    pub event: String,
    /// "rare", "uncommon", or "common".
    pub frequency: String,
    pub severity: Severity,
    pub monitoring: String,
}

/// The full drug safety database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugDatabase {
    #[serde(default)]
    interactions: Vec<Interaction>,

    #[serde(default)]
    contraindications: Vec<Contraindication>,

    #[serde(default)]
    adverse_events: Vec<AdverseEvent>,

    /// Allergen class -> cross-reactive drug names.
    #[serde(default)]
    allergy_classes: HashMap<String, Vec<String>>,

    /// Drug name -> pregnancy category letter (A/B/C/D/X).
    #[serde(default)]
    pregnancy_categories: HashMap<String, String>,
}

impl DrugDatabase {
    /// Load a database from a TOML file.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let db: Self = crate::read_toml(path)?;
        info!(
            interactions = db.interactions.len(),
            contraindications = db.contraindications.len(),
            "Loaded drug database from {}",
            path.display()
        );
        Ok(db)
    }

    /// Parse a database from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, KnowledgeError> {
        toml::from_str(text).map_err(|e| KnowledgeError::Invalid(e.to_string()))
    }

    /// Look up an interaction for an unordered drug pair.
    pub fn interaction(&self, drug_a: &str, drug_b: &str) -> Option<&Interaction> {
        self.interactions.iter().find(|i| {
            (i.drug_a.eq_ignore_ascii_case(drug_a) && i.drug_b.eq_ignore_ascii_case(drug_b))
                || (i.drug_a.eq_ignore_ascii_case(drug_b)
                    && i.drug_b.eq_ignore_ascii_case(drug_a))
        })
    }

    /// All interactions in the table.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Look up a contraindication for a (drug, condition) pair.
    pub fn contraindication(&self, drug: &str, condition: &str) -> Option<&Contraindication> {
        self.contraindications.iter().find(|c| {
            c.drug.eq_ignore_ascii_case(drug) && c.condition.eq_ignore_ascii_case(condition)
        })
    }

    /// Known adverse events for a drug.
    pub fn adverse_events(&self, drug: &str) -> Vec<&AdverseEvent> {
        self.adverse_events
            .iter()
            .filter(|a| a.drug.eq_ignore_ascii_case(drug))
            .collect()
    }

    /// Cross-reactive drugs for an allergen class whose name contains
    /// the declared allergy, lowercased.
    pub fn cross_reactive(&self, allergy: &str) -> Vec<(&str, &[String])> {
        let allergy = allergy.to_lowercase();
        self.allergy_classes
            .iter()
            .filter(|(class, _)| class.contains(&allergy) || allergy.contains(class.as_str()))
            .map(|(class, drugs)| (class.as_str(), drugs.as_slice()))
            .collect()
    }

    /// Pregnancy category for a drug, if known.
    pub fn pregnancy_category(&self, drug: &str) -> Option<&str> {
        self.pregnancy_categories
            .get(&drug.to_lowercase())
            .map(String::as_str)
    }
}

impl Default for DrugDatabase {
    /// The built-in safety tables.
    fn default() -> Self {
        fn interaction(
            drug_a: &str,
            drug_b: &str,
            severity: Severity,
            mechanism: &str,
            recommendation: &str,
        ) -> Interaction {
            Interaction {
                drug_a: drug_a.into(),
                drug_b: drug_b.into(),
                severity,
                mechanism: mechanism.into(),
                recommendation: recommendation.into(),
            }
        }

        fn contraindication(
            drug: &str,
            condition: &str,
            severity: Severity,
            reason: &str,
            alternative: &str,
        ) -> Contraindication {
            Contraindication {
                drug: drug.into(),
                condition: condition.into(),
                severity,
                reason: reason.into(),
                alternative: Some(alternative.into()),
            }
        }

        fn adverse(
            drug: &str,
            event: &str,
            frequency: &str,
            severity: Severity,
            monitoring: &str,
        ) -> AdverseEvent {
            AdverseEvent {
                drug: drug.into(),
                event: event.into(),
                frequency: frequency.into(),
                severity,
                monitoring: monitoring.into(),
            }
        }

        let interactions = vec![
            interaction(
                "warfarin",
                "aspirin",
                Severity::Critical,
                "Increased bleeding risk due to dual anticoagulation",
                "Avoid if possible. If necessary, monitor INR closely and adjust warfarin dose.",
            ),
            interaction(
                "metformin",
                "contrast_dye",
                Severity::Major,
                "Risk of contrast-induced nephropathy and lactic acidosis",
                "Hold metformin 48 hours before and after contrast procedure. Check renal function.",
            ),
            interaction(
                "lisinopril",
                "potassium",
                Severity::Major,
                "Risk of hyperkalemia",
                "Monitor K+ levels. Use only if indicated. Check renal function.",
            ),
            interaction(
                "simvastatin",
                "clarithromycin",
                Severity::Major,
                "Increased statin levels, risk of myopathy",
                "Consider alternative antibiotic or temporary statin cessation.",
            ),
            interaction(
                "ssri",
                "maoi",
                Severity::Critical,
                "Risk of serotonin syndrome",
                "Absolute contraindication. Washout period required (14 days for MAOIs).",
            ),
            interaction(
                "methotrexate",
                "nsaid",
                Severity::Major,
                "Decreased MTX clearance, increased toxicity",
                "Avoid NSAIDs. Use acetaminophen or COX-2 inhibitors with caution.",
            ),
        ];

        let contraindications = vec![
            contraindication(
                "ace_inhibitor",
                "hyperkalemia",
                Severity::Major,
                "ACE inhibitors reduce potassium excretion",
                "Use alternative antihypertensive with K+ monitoring",
            ),
            contraindication(
                "nsaid",
                "acute_kidney_injury",
                Severity::Major,
                "NSAIDs reduce renal perfusion",
                "Use acetaminophen instead",
            ),
            contraindication(
                "beta_blocker",
                "asthma",
                Severity::Major,
                "Beta blockers can cause bronchospasm",
                "Use calcium channel blocker or cardioselective beta blocker with caution",
            ),
            contraindication(
                "statin",
                "muscle_disease",
                Severity::Moderate,
                "Risk of myositis and rhabdomyolysis",
                "Use lower dose with close monitoring",
            ),
            contraindication(
                "metformin",
                "severe_renal_disease",
                Severity::Major,
                "Risk of lactic acidosis",
                "Use insulin or other glucose-lowering agent",
            ),
        ];

        let adverse_events = vec![
            adverse(
                "chloroquine",
                "Retinopathy",
                "uncommon",
                Severity::Major,
                "Ophthalmology exam at baseline and annually",
            ),
            adverse(
                "chloroquine",
                "Myopathy",
                "uncommon",
                Severity::Major,
                "Monitor muscle strength, CK levels",
            ),
            adverse(
                "warfarin",
                "Bleeding",
                "common",
                Severity::Major,
                "INR monitoring, signs of bleeding",
            ),
            adverse(
                "metformin",
                "GI upset",
                "common",
                Severity::Minor,
                "Take with food, slow titration",
            ),
        ];

        let allergy_classes = HashMap::from([
            (
                "penicillin".to_string(),
                vec!["amoxicillin".into(), "ampicillin".into(), "piperacillin".into()],
            ),
            (
                "sulfonamide".to_string(),
                vec!["sulfamethoxazole".into(), "sulfadiazine".into()],
            ),
            (
                "macrolide".to_string(),
                vec!["erythromycin".into(), "clarithromycin".into()],
            ),
        ]);

        let pregnancy_categories = HashMap::from([
            ("acetaminophen".to_string(), "A".to_string()),
            ("penicillin".to_string(), "B".to_string()),
            ("tetracycline".to_string(), "D".to_string()),
            ("warfarin".to_string(), "X".to_string()),
            ("metformin".to_string(), "B".to_string()),
            ("methotrexate".to_string(), "X".to_string()),
        ]);

        Self {
            interactions,
            contraindications,
            adverse_events,
            allergy_classes,
            pregnancy_categories,
        }
    }
}
