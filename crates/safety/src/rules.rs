//! Rule-based risk screening of generated text.
//!
//! Generated output must never reach a reader with explicit dosing
//! instructions, a definitive diagnosis stated as fact, or direct medical
//! advice. Each rule is a small set of patterns; the first matching
//! pattern in a category flags it.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The result of screening one piece of generated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// True when any rule fired.
    pub high_risk: bool,

    /// One warning per rule category that fired.
    pub warnings: Vec<String>,
}

/// Compiled screening rules.
pub struct OutputRiskScreen {
    dosage: Vec<Regex>,
    definitive_diagnosis: Vec<Regex>,
    direct_advice: Vec<Regex>,
}

impl OutputRiskScreen {
    pub fn new() -> Self {
        fn compile(patterns: &[&str]) -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern compiles"))
                .collect()
        }

        Self {
            dosage: compile(&[
                r"\w+ \d+(mg|mcg|g|ml) \w+ \d+(times|x) \w+",
                r"take \w+ \d+(mg|mcg|g|ml)",
                r"prescribe \w+ \d+(mg|mcg|g|ml)",
            ]),
            definitive_diagnosis: compile(&[
                r"the diagnosis is",
                r"patient has \w+",
                r"it is certain that \w+",
            ]),
            direct_advice: compile(&[
                r"you should \w+",
                r"i recommend you \w+",
                r"do \w+ immediately",
            ]),
        }
    }

    /// Screen a piece of generated text.
    pub fn screen(&self, text: &str) -> RiskAssessment {
        let mut assessment = RiskAssessment::default();

        if self.dosage.iter().any(|r| r.is_match(text)) {
            assessment.high_risk = true;
            assessment
                .warnings
                .push("Explicit medication dosage instruction detected.".into());
        }

        if self.definitive_diagnosis.iter().any(|r| r.is_match(text)) {
            assessment.high_risk = true;
            assessment
                .warnings
                .push("Unqualified or definitive diagnosis detected.".into());
        }

        if self.direct_advice.iter().any(|r| r.is_match(text)) {
            assessment.high_risk = true;
            assessment
                .warnings
                .push("Direct medical advice detected.".into());
        }

        if assessment.high_risk {
            warn!(
                warnings = assessment.warnings.len(),
                "Generated output flagged as high risk"
            );
        }

        assessment
    }
}

impl Default for OutputRiskScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dosage_instruction_is_flagged() {
        let screen = OutputRiskScreen::new();
        let result = screen.screen("The patient should take Amoxicillin 500mg daily for 7 days.");
        assert!(result.high_risk);
    }

    #[test]
    fn definitive_diagnosis_is_flagged() {
        let screen = OutputRiskScreen::new();
        let result = screen.screen("It is certain that the patient has pneumonia.");
        assert!(result.high_risk);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("definitive diagnosis")));
    }

    #[test]
    fn direct_advice_is_flagged() {
        let screen = OutputRiskScreen::new();
        let result = screen.screen("You should go to the emergency room immediately.");
        assert!(result.high_risk);
    }

    #[test]
    fn hedged_guidance_passes() {
        let screen = OutputRiskScreen::new();
        let result =
            screen.screen("Rest and hydration are recommended. Follow-up with a doctor.");
        assert!(!result.high_risk);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn differential_list_passes() {
        let screen = OutputRiskScreen::new();
        let result = screen.screen("Differential Diagnosis: Bronchitis, Pneumonia, Asthma.");
        assert!(!result.high_risk);
    }

    #[test]
    fn multiple_categories_stack_warnings() {
        let screen = OutputRiskScreen::new();
        let result =
            screen.screen("The diagnosis is influenza. You should take oseltamivir 75mg now.");
        assert!(result.high_risk);
        assert!(result.warnings.len() >= 2);
    }
}
