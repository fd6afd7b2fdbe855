//! Drug interaction checking engine.

use clinmesh_knowledge::{AdverseEvent, Contraindication, DrugDatabase, Interaction};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

/// A medication that conflicts with a declared allergy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergyConflict {
    pub medication: String,
    pub allergy: String,
    /// "direct" or the cross-reactivity class name.
    pub kind: String,
}

/// Pregnancy safety note for one medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyNote {
    pub medication: String,
    /// Category letter, or "UNKNOWN".
    pub category: String,
    pub recommendation: String,
}

/// The combined result of a comprehensive safety check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub interactions: Vec<Interaction>,
    pub contraindications: Vec<Contraindication>,
    pub allergy_conflicts: Vec<AllergyConflict>,
    pub adverse_events: Vec<AdverseEvent>,
    pub pregnancy_notes: Vec<PregnancyNote>,
}

impl SafetyCheck {
    /// Total number of actionable findings (adverse events and pregnancy
    /// notes are informational).
    pub fn issue_count(&self) -> usize {
        self.interactions.len() + self.contraindications.len() + self.allergy_conflicts.len()
    }

    /// Render the check as a plain-text report.
    pub fn format_report(&self) -> String {
        let mut report = String::from("MEDICATION SAFETY REPORT\n");
        report.push_str(&"=".repeat(60));
        report.push_str("\n\n");

        if !self.interactions.is_empty() {
            report.push_str("DRUG-DRUG INTERACTIONS:\n");
            for i in &self.interactions {
                let _ = writeln!(report, "! {}: {} + {}", i.severity, i.drug_a, i.drug_b);
                let _ = writeln!(report, "   Mechanism: {}", i.mechanism);
                let _ = writeln!(report, "   Recommendation: {}\n", i.recommendation);
            }
        }

        if !self.contraindications.is_empty() {
            report.push_str("CONTRAINDICATIONS:\n");
            for c in &self.contraindications {
                let _ = writeln!(report, "! {}: {} in {}", c.severity, c.drug, c.condition);
                let _ = writeln!(report, "   Reason: {}", c.reason);
                if let Some(alt) = &c.alternative {
                    let _ = writeln!(report, "   Alternative: {alt}");
                }
                report.push('\n');
            }
        }

        if !self.allergy_conflicts.is_empty() {
            report.push_str("ALLERGY ALERTS:\n");
            for a in &self.allergy_conflicts {
                let _ = writeln!(
                    report,
                    "! {} may cause reaction in patient allergic to {} ({})",
                    a.medication, a.allergy, a.kind
                );
            }
            report.push('\n');
        }

        if !self.adverse_events.is_empty() {
            report.push_str("KNOWN ADVERSE EVENTS:\n");
            for ae in &self.adverse_events {
                let _ = writeln!(report, "- {}: {} ({})", ae.drug, ae.event, ae.frequency);
                let _ = writeln!(report, "  Monitor: {}", ae.monitoring);
            }
            report.push('\n');
        }

        if !self.pregnancy_notes.is_empty() {
            report.push_str("PREGNANCY SAFETY:\n");
            for p in &self.pregnancy_notes {
                let _ = writeln!(
                    report,
                    "- {}: Category {} - {}",
                    p.medication, p.category, p.recommendation
                );
            }
        }

        if self.issue_count() == 0 && self.adverse_events.is_empty() && self.pregnancy_notes.is_empty()
        {
            report.push_str("No safety concerns identified.\n");
        }

        report
    }
}

/// The main safety checking engine over an injected drug database.
pub struct InteractionChecker {
    db: Arc<DrugDatabase>,
}

impl InteractionChecker {
    pub fn new(db: Arc<DrugDatabase>) -> Self {
        Self { db }
    }

    /// Check all unordered medication pairs against the interaction table.
    ///
    /// Results are sorted by severity, most severe first.
    pub fn drug_interactions(&self, medications: &[String]) -> Vec<Interaction> {
        let mut hits: Vec<Interaction> = Vec::new();

        for (i, drug_a) in medications.iter().enumerate() {
            for drug_b in &medications[i + 1..] {
                if let Some(interaction) = self.db.interaction(drug_a, drug_b) {
                    hits.push(interaction.clone());
                }
            }
        }

        hits.sort_by_key(|i| i.severity);
        info!(count = hits.len(), "Checked drug-drug interactions");
        hits
    }

    /// Check medications against diagnosed or declared conditions.
    ///
    /// Besides the full condition string, the first whitespace-separated
    /// word is tried so "asthma (mild)" still matches "asthma".
    pub fn contraindications(
        &self,
        medications: &[String],
        conditions: &[String],
    ) -> Vec<Contraindication> {
        let mut hits: Vec<Contraindication> = Vec::new();

        for medication in medications {
            for condition in conditions {
                let hit = self.db.contraindication(medication, condition).or_else(|| {
                    condition
                        .split_whitespace()
                        .next()
                        .and_then(|head| self.db.contraindication(medication, head))
                });
                if let Some(c) = hit {
                    hits.push(c.clone());
                }
            }
        }

        hits.sort_by_key(|c| c.severity);
        info!(count = hits.len(), "Checked contraindications");
        hits
    }

    /// Check proposed medications against known allergies.
    ///
    /// Direct conflicts are substring matches in either direction;
    /// cross-reactive conflicts come from the allergen class table.
    pub fn allergy_conflicts(
        &self,
        medications: &[String],
        allergies: &[String],
    ) -> Vec<AllergyConflict> {
        let mut conflicts = Vec::new();

        for medication in medications {
            let med_lower = medication.to_lowercase();

            for allergy in allergies {
                let allergy_lower = allergy.to_lowercase();

                if med_lower.contains(&allergy_lower) || allergy_lower.contains(&med_lower) {
                    conflicts.push(AllergyConflict {
                        medication: medication.clone(),
                        allergy: allergy.clone(),
                        kind: "direct".into(),
                    });
                }

                for (class, drugs) in self.db.cross_reactive(allergy) {
                    if drugs.iter().any(|d| med_lower.contains(d.as_str())) {
                        conflicts.push(AllergyConflict {
                            medication: medication.clone(),
                            allergy: allergy.clone(),
                            kind: class.to_string(),
                        });
                    }
                }
            }
        }

        debug!(count = conflicts.len(), "Checked allergy conflicts");
        conflicts
    }

    /// Known adverse events for the given medications.
    pub fn adverse_events(&self, medications: &[String]) -> Vec<AdverseEvent> {
        medications
            .iter()
            .flat_map(|m| self.db.adverse_events(m).into_iter().cloned())
            .collect()
    }

    /// Pregnancy safety notes; empty unless the patient is pregnant.
    pub fn pregnancy_safety(&self, medications: &[String], is_pregnant: bool) -> Vec<PregnancyNote> {
        if !is_pregnant {
            return Vec::new();
        }

        medications
            .iter()
            .map(|medication| {
                let category = self
                    .db
                    .pregnancy_category(medication)
                    .unwrap_or("UNKNOWN")
                    .to_string();
                let recommendation = match category.as_str() {
                    "A" => "Safe - No risk",
                    "B" => "Probably safe - Animal studies OK",
                    "C" => "Use with caution - Animal studies show risk",
                    "D" => "Avoid if possible - Evidence of risk",
                    "X" => "CONTRAINDICATED - Teratogenic",
                    _ => "Unknown safety profile",
                }
                .to_string();
                PregnancyNote {
                    medication: medication.clone(),
                    category,
                    recommendation,
                }
            })
            .collect()
    }

    /// Run every check and assemble the combined report.
    pub fn comprehensive(
        &self,
        medications: &[String],
        conditions: &[String],
        allergies: &[String],
        is_pregnant: bool,
    ) -> SafetyCheck {
        SafetyCheck {
            interactions: self.drug_interactions(medications),
            contraindications: self.contraindications(medications, conditions),
            allergy_conflicts: self.allergy_conflicts(medications, allergies),
            adverse_events: self.adverse_events(medications),
            pregnancy_notes: self.pregnancy_safety(medications, is_pregnant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> InteractionChecker {
        InteractionChecker::new(Arc::new(DrugDatabase::default()))
    }

    fn meds(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn warfarin_aspirin_is_critical_regardless_of_order() {
        let checker = checker();

        let forward = checker.drug_interactions(&meds(&["warfarin", "aspirin"]));
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].severity, clinmesh_knowledge::Severity::Critical);

        let reverse = checker.drug_interactions(&meds(&["aspirin", "warfarin"]));
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse[0].mechanism, forward[0].mechanism);
    }

    #[test]
    fn interactions_sorted_by_severity() {
        let checker = checker();
        let hits =
            checker.drug_interactions(&meds(&["metformin", "contrast_dye", "ssri", "maoi"]));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].severity, clinmesh_knowledge::Severity::Critical);
        assert_eq!(hits[1].severity, clinmesh_knowledge::Severity::Major);
    }

    #[test]
    fn no_interactions_for_safe_pair() {
        let checker = checker();
        assert!(checker
            .drug_interactions(&meds(&["acetaminophen", "amoxicillin"]))
            .is_empty());
    }

    #[test]
    fn contraindication_matches_first_word() {
        let checker = checker();
        let hits = checker.contraindications(
            &meds(&["beta_blocker"]),
            &meds(&["asthma (moderate persistent)"]),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].condition, "asthma");
    }

    #[test]
    fn direct_allergy_conflict() {
        let checker = checker();
        let conflicts =
            checker.allergy_conflicts(&meds(&["Penicillin V"]), &meds(&["penicillin"]));
        assert!(!conflicts.is_empty());
        assert_eq!(conflicts[0].kind, "direct");
    }

    #[test]
    fn cross_reactive_allergy_conflict() {
        let checker = checker();
        let conflicts = checker.allergy_conflicts(&meds(&["amoxicillin"]), &meds(&["Penicillin"]));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, "penicillin");
    }

    #[test]
    fn pregnancy_notes_only_when_pregnant() {
        let checker = checker();
        assert!(checker
            .pregnancy_safety(&meds(&["warfarin"]), false)
            .is_empty());

        let notes = checker.pregnancy_safety(&meds(&["warfarin", "novel_drug"]), true);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].category, "X");
        assert_eq!(notes[1].category, "UNKNOWN");
    }

    #[test]
    fn comprehensive_report_mentions_findings() {
        let checker = checker();
        let check = checker.comprehensive(
            &meds(&["warfarin", "aspirin"]),
            &meds(&[]),
            &meds(&["penicillin"]),
            false,
        );
        assert_eq!(check.issue_count(), 1);

        let report = check.format_report();
        assert!(report.contains("CRITICAL"));
        assert!(report.contains("warfarin"));
        assert!(report.contains("ADVERSE EVENTS"));
    }

    #[test]
    fn clean_check_reports_no_concerns() {
        let checker = checker();
        let check = checker.comprehensive(&meds(&["acetaminophen"]), &[], &[], false);
        assert_eq!(check.issue_count(), 0);
        assert!(check.format_report().contains("No safety concerns"));
    }
}
