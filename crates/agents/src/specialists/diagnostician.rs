//! Differential diagnosis specialist.

use async_trait::async_trait;
use clinmesh_core::error::AgentError;
use clinmesh_core::{AgentResponse, AgentRole, ClinicalAgent, PatientContext};
use clinmesh_knowledge::{DiagnosisLibrary, DiagnosisProfile};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Ranks candidate diagnoses by keyword match against a profile library.
pub struct Diagnostician {
    library: Arc<DiagnosisLibrary>,
}

/// A scored candidate diagnosis.
#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    confidence: f64,
}

impl Diagnostician {
    pub fn new(library: Arc<DiagnosisLibrary>) -> Self {
        Self { library }
    }

    /// Score every profile and keep the five strongest candidates.
    ///
    /// A profile keyword matches when it appears as a substring of any
    /// lowercased context entry, so "productive cough" matches the
    /// keyword "cough". Score is matched keywords over total keywords,
    /// scaled by the profile's prior weight. Sorting is stable, so equal
    /// scores keep library order.
    fn differential(&self, symptoms: &[String], findings: &[String]) -> Vec<Candidate> {
        let symptoms_lower: Vec<String> = symptoms.iter().map(|s| s.to_lowercase()).collect();
        let findings_lower: Vec<String> = findings.iter().map(|f| f.to_lowercase()).collect();

        let mut candidates: Vec<Candidate> = self
            .library
            .iter()
            .filter_map(|profile| Self::score(profile, &symptoms_lower, &findings_lower))
            .collect();

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(5);
        candidates
    }

    fn score(
        profile: &DiagnosisProfile,
        symptoms: &[String],
        findings: &[String],
    ) -> Option<Candidate> {
        let max_possible = profile.symptoms.len() + profile.findings.len();
        if max_possible == 0 {
            return None;
        }

        let symptom_hits = symptoms
            .iter()
            .filter(|s| profile.symptoms.iter().any(|ps| s.contains(ps.as_str())))
            .count();
        let finding_hits = findings
            .iter()
            .filter(|f| profile.findings.iter().any(|pf| f.contains(pf.as_str())))
            .count();

        let match_score = (symptom_hits + finding_hits) as f64 / max_possible as f64;
        Some(Candidate {
            name: profile.name.clone(),
            confidence: match_score * profile.weight,
        })
    }

    fn format_differential(candidates: &[Candidate]) -> String {
        if candidates.iter().all(|c| c.confidence == 0.0) {
            return "DIFFERENTIAL DIAGNOSES:\nNo strong diagnostic match for the presented findings.\n".into();
        }
        let mut output = String::from("DIFFERENTIAL DIAGNOSES:\n");
        for (i, candidate) in candidates.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {}: {:.1}%",
                i + 1,
                candidate.name,
                candidate.confidence * 100.0
            );
        }
        output
    }
}

#[async_trait]
impl ClinicalAgent for Diagnostician {
    fn role(&self) -> AgentRole {
        AgentRole::Diagnostician
    }

    async fn process(
        &self,
        _query: &str,
        context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        let candidates = self.differential(&context.symptoms, &context.findings);
        let confidence = candidates.first().map(|c| c.confidence).unwrap_or(0.0);

        debug!(
            candidates = candidates.len(),
            confidence, "Differential generated"
        );

        Ok(AgentResponse {
            agent: self.role(),
            output: Self::format_differential(&candidates),
            confidence,
            reasoning: format!(
                "Analyzed {} symptoms and {} findings to generate differential.",
                context.symptoms.len(),
                context.findings.len()
            ),
            next_agents: vec![AgentRole::SafetyMonitor, AgentRole::EvidenceLookup],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Diagnostician {
        Diagnostician::new(Arc::new(DiagnosisLibrary::default()))
    }

    fn ctx(symptoms: &[&str], findings: &[&str]) -> PatientContext {
        PatientContext {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            findings: findings.iter().map(|f| f.to_string()).collect(),
            ..PatientContext::default()
        }
    }

    #[tokio::test]
    async fn full_pneumonia_match_scores_weight() {
        let response = agent()
            .process(
                "patient with fever",
                &ctx(&["fever", "cough", "dyspnea"], &["crackles", "consolidation"]),
            )
            .await
            .unwrap();

        // All five keywords hit, so confidence equals the profile weight.
        assert!((response.confidence - 0.95).abs() < 1e-9);
        assert!(response.output.contains("Pneumonia"));
    }

    #[tokio::test]
    async fn empty_context_yields_zero_confidence() {
        let response = agent()
            .process("no information", &PatientContext::default())
            .await
            .unwrap();

        assert_eq!(response.confidence, 0.0);
        assert!(response.output.contains("No strong diagnostic match"));
    }

    #[tokio::test]
    async fn substring_keywords_match_free_text() {
        let response = agent()
            .process(
                "cough workup",
                &ctx(&["productive cough", "high fever"], &["crackles RLL"]),
            )
            .await
            .unwrap();

        // "cough", "fever", "crackles" are substrings of the entries.
        assert!(response.confidence > 0.0);
        assert!(response.output.starts_with("DIFFERENTIAL DIAGNOSES:"));
    }

    #[tokio::test]
    async fn at_most_five_candidates_listed() {
        let response = agent()
            .process("febrile illness", &ctx(&["fever", "cough"], &[]))
            .await
            .unwrap();

        let lines = response
            .output
            .lines()
            .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .count();
        assert!(lines <= 5);
    }

    #[tokio::test]
    async fn always_nominates_safety_and_evidence() {
        let response = agent()
            .process("anything", &PatientContext::default())
            .await
            .unwrap();
        assert_eq!(
            response.next_agents,
            vec![AgentRole::SafetyMonitor, AgentRole::EvidenceLookup]
        );
    }
}
