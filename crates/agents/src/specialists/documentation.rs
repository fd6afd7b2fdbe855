//! Clinical documentation specialist.

use async_trait::async_trait;
use clinmesh_core::error::AgentError;
use clinmesh_core::{AgentResponse, AgentRole, ClinicalAgent, PatientContext};
use std::fmt::Write as _;

/// Renders a SOAP note from the patient context. Terminal agent.
pub struct DocumentationAgent;

impl DocumentationAgent {
    pub fn new() -> Self {
        Self
    }

    fn soap_note(context: &PatientContext) -> String {
        let mut note = String::from("CLINICAL NOTE - SOAP FORMAT\n");
        note.push_str(&"=".repeat(60));
        note.push_str("\n\n");

        note.push_str("SUBJECTIVE:\nPatient reports:\n");
        for symptom in &context.symptoms {
            let _ = writeln!(note, "- {symptom}");
        }
        note.push('\n');

        note.push_str("OBJECTIVE:\nPhysical Examination:\n");
        for finding in &context.findings {
            let _ = writeln!(note, "- {finding}");
        }
        if !context.tests.is_empty() {
            note.push_str("\nDiagnostic Tests:\n");
            for test in &context.tests {
                let _ = writeln!(note, "- {test}");
            }
        }
        note.push('\n');

        let _ = writeln!(
            note,
            "ASSESSMENT:\n{}\n",
            context.diagnosis.as_deref().unwrap_or("")
        );
        let _ = writeln!(note, "PLAN:\n{}", context.plan.as_deref().unwrap_or(""));

        note
    }
}

impl Default for DocumentationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClinicalAgent for DocumentationAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Documentation
    }

    async fn process(
        &self,
        _query: &str,
        context: &PatientContext,
    ) -> Result<AgentResponse, AgentError> {
        Ok(AgentResponse {
            agent: self.role(),
            output: Self::soap_note(context),
            confidence: 0.95,
            reasoning: "Generated SOAP note with complete clinical documentation.".into(),
            next_agents: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn note_contains_all_sections() {
        let context = PatientContext {
            symptoms: vec!["fever".into(), "cough".into()],
            findings: vec!["crackles RLL".into()],
            tests: vec!["chest x-ray".into()],
            diagnosis: Some("Community-acquired pneumonia".into()),
            plan: Some("Amoxicillin, follow-up in 48h".into()),
            ..PatientContext::default()
        };

        let response = DocumentationAgent::new()
            .process("document encounter", &context)
            .await
            .unwrap();

        for section in ["SUBJECTIVE:", "OBJECTIVE:", "ASSESSMENT:", "PLAN:"] {
            assert!(response.output.contains(section), "missing {section}");
        }
        assert!(response.output.contains("Community-acquired pneumonia"));
        assert!(response.output.contains("Diagnostic Tests:"));
        assert!((response.confidence - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn terminal_agent_nominates_no_one() {
        let response = DocumentationAgent::new()
            .process("document", &PatientContext::default())
            .await
            .unwrap();
        assert!(response.next_agents.is_empty());
        // Tests section omitted when no tests recorded.
        assert!(!response.output.contains("Diagnostic Tests:"));
    }
}
