//! Treatment safety specialist.

use async_trait::async_trait;
use clinmesh_core::error::AgentError;
use clinmesh_core::{AgentResponse, AgentRole, ClinicalAgent, PatientContext};
use clinmesh_knowledge::DrugDatabase;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Screens the proposed treatment (the query text) against the patient's
/// medications, allergies, and contraindications.
pub struct SafetyMonitorAgent {
    db: Arc<DrugDatabase>,
}

impl SafetyMonitorAgent {
    pub fn new(db: Arc<DrugDatabase>) -> Self {
        Self { db }
    }

    /// Collect safety issues for a proposed treatment.
    ///
    /// An interaction fires when one drug of a known pair appears in the
    /// treatment text and the other in the current medication list, in
    /// either assignment. Allergy and contraindication hits are
    /// case-insensitive substring matches against the treatment text.
    fn identify_issues(&self, treatment: &str, context: &PatientContext) -> Vec<String> {
        let treatment_lower = treatment.to_lowercase();
        let meds_lower: Vec<String> = context
            .medications
            .iter()
            .map(|m| m.to_lowercase())
            .collect();
        let mut issues = Vec::new();

        for interaction in self.db.interactions() {
            let a = interaction.drug_a.to_lowercase();
            let b = interaction.drug_b.to_lowercase();
            let forward =
                treatment_lower.contains(&a) && meds_lower.iter().any(|m| m.contains(&b));
            let reverse =
                treatment_lower.contains(&b) && meds_lower.iter().any(|m| m.contains(&a));
            if forward || reverse {
                issues.push(format!(
                    "{}: {} + {} - {}",
                    interaction.severity, interaction.drug_a, interaction.drug_b,
                    interaction.mechanism
                ));
            }
        }

        for allergy in &context.allergies {
            if treatment_lower.contains(&allergy.to_lowercase()) {
                issues.push(format!("CRITICAL: Patient allergic to {allergy}"));
            }
        }

        for contraindication in &context.contraindications {
            if treatment_lower.contains(&contraindication.to_lowercase()) {
                issues.push(format!("CONTRAINDICATED: {contraindication}"));
            }
        }

        issues
    }

    fn format_report(issues: &[String], level: &str) -> String {
        let mut output = format!("SAFETY ASSESSMENT: {level}\n");
        if issues.is_empty() {
            output.push_str("No safety concerns identified.\n");
        } else {
            output.push_str("Issues identified:\n");
            for issue in issues {
                let _ = writeln!(output, "- {issue}");
            }
        }
        output
    }
}

#[async_trait]
impl ClinicalAgent for SafetyMonitorAgent {
    fn role(&self) -> AgentRole {
        AgentRole::SafetyMonitor
    }

    async fn process(
        &self,
        query: &str,
        context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        let issues = self.identify_issues(query, context);

        let level = match issues.len() {
            0 => "Safe",
            1..=2 => "Caution",
            _ => "ALERT",
        };
        let confidence = (1.0 - 0.2 * issues.len() as f64).max(0.0);

        let next_agents = if issues.is_empty() {
            vec![AgentRole::Documentation]
        } else {
            vec![AgentRole::EvidenceLookup]
        };

        debug!(issues = issues.len(), level, "Safety assessment complete");

        Ok(AgentResponse {
            agent: self.role(),
            output: Self::format_report(&issues, level),
            confidence,
            reasoning: format!(
                "Checked for interactions with {} medications and {} allergies.",
                context.medications.len(),
                context.allergies.len()
            ),
            next_agents,
        })
    }
}
