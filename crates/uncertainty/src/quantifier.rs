//! Epistemic/aleatoric uncertainty estimation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk tier derived from confidence and supporting evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Full uncertainty breakdown for one prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertaintyEstimate {
    pub prediction: String,
    /// Primary probability discounted by epistemic uncertainty.
    pub confidence: f64,
    pub epistemic_uncertainty: f64,
    pub aleatoric_uncertainty: f64,
    /// Bootstrap percentile interval over candidate confidences.
    pub confidence_interval: (f64, f64),
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// Summary statistics over the estimates produced so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    pub mean_confidence: f64,
    pub std_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub total_predictions: usize,
}

/// Quantifies uncertainty in clinical predictions.
pub struct UncertaintyQuantifier {
    n_bootstrap: usize,
    confidence_level: f64,
    history: Vec<UncertaintyEstimate>,
}

impl UncertaintyQuantifier {
    pub fn new() -> Self {
        Self {
            n_bootstrap: 50,
            confidence_level: 0.95,
            history: Vec::new(),
        }
    }

    pub fn with_bootstrap_samples(mut self, n_bootstrap: usize) -> Self {
        self.n_bootstrap = n_bootstrap;
        self
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Numerically stable softmax.
    pub fn softmax(logits: &[f64]) -> Vec<f64> {
        if logits.is_empty() {
            return Vec::new();
        }
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    /// Variance of the softmax distribution, normalized so a one-hot
    /// distribution approaches 1.0 and a uniform one is 0.0.
    pub fn epistemic(logits: &[f64]) -> f64 {
        let probs = Self::softmax(logits);
        if probs.is_empty() {
            return 0.0;
        }
        let mean = probs.iter().sum::<f64>() / probs.len() as f64;
        let variance =
            probs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / probs.len() as f64;
        (variance / (1.0 / probs.len() as f64)).min(1.0)
    }

    /// Entropy of the softmax distribution over its maximum, so a uniform
    /// distribution scores 1.0 and a one-hot distribution 0.0.
    pub fn aleatoric(logits: &[f64]) -> f64 {
        let probs = Self::softmax(logits);
        if probs.len() < 2 {
            return 0.0;
        }
        let entropy: f64 = probs.iter().map(|p| -p * (p + 1e-10).ln()).sum();
        entropy / (probs.len() as f64).ln()
    }

    /// Bootstrap percentile interval over candidate confidences.
    ///
    /// With no candidates the interval is maximally wide, (0.0, 1.0).
    pub fn confidence_interval(&self, predictions: &[f64]) -> (f64, f64) {
        if predictions.is_empty() {
            return (0.0, 1.0);
        }

        let alpha = 1.0 - self.confidence_level;
        let mut rng = rand::rng();
        let n = predictions.len();

        let mut means: Vec<f64> = (0..self.n_bootstrap)
            .map(|_| {
                let sum: f64 = (0..n)
                    .map(|_| predictions[rng.random_range(0..n)])
                    .sum();
                sum / n as f64
            })
            .collect();
        means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        (
            percentile(&means, alpha / 2.0 * 100.0),
            percentile(&means, (1.0 - alpha / 2.0) * 100.0),
        )
    }

    /// Full uncertainty estimate for a primary prediction.
    ///
    /// `alternatives` are competing (diagnosis, confidence) candidates;
    /// their confidences widen the bootstrap interval.
    pub fn estimate(
        &mut self,
        prediction: &str,
        logits: &[f64],
        supporting_evidence: &[String],
        alternatives: &[(String, f64)],
    ) -> UncertaintyEstimate {
        let probs = Self::softmax(logits);
        let primary_prob = probs.iter().copied().fold(0.0, f64::max);

        let epistemic = Self::epistemic(logits);
        let aleatoric = Self::aleatoric(logits);
        let confidence = primary_prob * (1.0 - epistemic);

        let risk_level = assess_risk(confidence, supporting_evidence.len());

        let mut candidates = vec![primary_prob];
        candidates.extend(alternatives.iter().map(|(_, c)| *c));
        let confidence_interval = self.confidence_interval(&candidates);

        let explanation = explain(
            confidence,
            epistemic,
            aleatoric,
            risk_level,
            supporting_evidence,
            alternatives,
        );

        debug!(
            prediction,
            confidence, epistemic, aleatoric, "Uncertainty estimated"
        );

        let estimate = UncertaintyEstimate {
            prediction: prediction.to_string(),
            confidence,
            epistemic_uncertainty: epistemic,
            aleatoric_uncertainty: aleatoric,
            confidence_interval,
            risk_level,
            explanation,
        };
        self.history.push(estimate.clone());
        estimate
    }

    /// Calibration summary over all estimates made so far.
    pub fn calibration_metrics(&self) -> CalibrationMetrics {
        if self.history.is_empty() {
            return CalibrationMetrics::default();
        }

        let confidences: Vec<f64> = self.history.iter().map(|e| e.confidence).collect();
        let n = confidences.len() as f64;
        let mean = confidences.iter().sum::<f64>() / n;
        let variance = confidences.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;

        CalibrationMetrics {
            mean_confidence: mean,
            std_confidence: variance.sqrt(),
            min_confidence: confidences.iter().copied().fold(f64::INFINITY, f64::min),
            max_confidence: confidences.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total_predictions: self.history.len(),
        }
    }
}

impl Default for UncertaintyQuantifier {
    fn default() -> Self {
        Self::new()
    }
}

fn assess_risk(confidence: f64, evidence_count: usize) -> RiskLevel {
    if confidence > 0.8 && evidence_count >= 2 {
        RiskLevel::Low
    } else if confidence > 0.6 && evidence_count >= 1 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

fn explain(
    confidence: f64,
    epistemic: f64,
    aleatoric: f64,
    risk_level: RiskLevel,
    supporting_evidence: &[String],
    alternatives: &[(String, f64)],
) -> String {
    let mut explanation = format!("Model confidence: {:.1}%. ", confidence * 100.0);

    if epistemic > 0.5 {
        explanation.push_str("Model has significant knowledge gaps for this case. ");
    }
    if aleatoric > 0.5 {
        explanation.push_str("Prediction is inherently ambiguous. ");
    }

    explanation.push_str(&format!("Risk level: {risk_level}. "));

    if !supporting_evidence.is_empty() {
        let cited: Vec<&str> = supporting_evidence
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        explanation.push_str(&format!("Supporting evidence: {}. ", cited.join(", ")));
    }

    if alternatives.len() > 1 {
        let names: Vec<&str> = alternatives
            .iter()
            .skip(1)
            .take(2)
            .map(|(name, _)| name.as_str())
            .collect();
        explanation.push_str(&format!("Alternative diagnoses: {}. ", names.join(", ")));
    }

    explanation.push_str("ALWAYS verify with clinical judgment and confirmatory tests.");
    explanation
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let probs = UncertaintyQuantifier::softmax(&[2.1, 1.5, 0.8, 0.3]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn uniform_logits_are_maximally_ambiguous() {
        let logits = [1.0, 1.0, 1.0, 1.0];
        assert!((UncertaintyQuantifier::aleatoric(&logits) - 1.0).abs() < 1e-6);
        assert!(UncertaintyQuantifier::epistemic(&logits) < 1e-9);
    }

    #[test]
    fn peaked_logits_have_low_entropy() {
        let logits = [10.0, 0.0, 0.0, 0.0];
        assert!(UncertaintyQuantifier::aleatoric(&logits) < 0.1);
        assert!(UncertaintyQuantifier::epistemic(&logits) > 0.5);
    }

    #[test]
    fn empty_candidates_give_widest_interval() {
        let quantifier = UncertaintyQuantifier::new();
        assert_eq!(quantifier.confidence_interval(&[]), (0.0, 1.0));
    }

    #[test]
    fn constant_candidates_give_degenerate_interval() {
        let quantifier = UncertaintyQuantifier::new();
        let (lower, upper) = quantifier.confidence_interval(&[0.7, 0.7, 0.7]);
        assert!((lower - 0.7).abs() < 1e-9);
        assert!((upper - 0.7).abs() < 1e-9);
    }

    #[test]
    fn interval_brackets_the_mean() {
        let quantifier = UncertaintyQuantifier::new();
        let candidates = [0.9, 0.25, 0.15, 0.6, 0.45];
        let (lower, upper) = quantifier.confidence_interval(&candidates);
        assert!(lower <= upper);
        assert!(lower >= 0.15 && upper <= 0.9);
    }

    #[test]
    fn risk_levels_follow_confidence_and_evidence() {
        assert_eq!(assess_risk(0.9, 3), RiskLevel::Low);
        assert_eq!(assess_risk(0.7, 1), RiskLevel::Moderate);
        assert_eq!(assess_risk(0.9, 0), RiskLevel::High);
        assert_eq!(assess_risk(0.3, 5), RiskLevel::High);
    }

    #[test]
    fn estimate_populates_every_field() {
        let mut quantifier = UncertaintyQuantifier::new();
        let evidence = vec![
            "Fever 38.9C".to_string(),
            "Productive cough 3 days".to_string(),
            "Crackles RLL".to_string(),
        ];
        let alternatives = vec![
            ("Bronchitis".to_string(), 0.25),
            ("Viral infection".to_string(), 0.15),
        ];

        let estimate = quantifier.estimate("Pneumonia", &[2.1, 1.5, 0.8, 0.3], &evidence, &alternatives);

        assert_eq!(estimate.prediction, "Pneumonia");
        assert!(estimate.confidence > 0.0 && estimate.confidence <= 1.0);
        assert!(estimate.explanation.contains("Supporting evidence: Fever 38.9C"));
        assert!(estimate.explanation.contains("Alternative diagnoses: Viral infection"));
        assert!(estimate.explanation.ends_with("confirmatory tests."));
    }

    #[test]
    fn calibration_metrics_track_history() {
        let mut quantifier = UncertaintyQuantifier::new();
        assert_eq!(quantifier.calibration_metrics().total_predictions, 0);

        quantifier.estimate("A", &[2.0, 0.5], &[], &[]);
        quantifier.estimate("B", &[1.0, 1.0], &[], &[]);

        let metrics = quantifier.calibration_metrics();
        assert_eq!(metrics.total_predictions, 2);
        assert!(metrics.min_confidence <= metrics.mean_confidence);
        assert!(metrics.mean_confidence <= metrics.max_confidence);
    }
}
