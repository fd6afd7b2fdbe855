//! Adaptive confidence threshold from observed outcomes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Outcome {
    prediction: String,
    confidence: f64,
    was_correct: bool,
}

/// Sliding-window calculator that derives the confidence cutoff needed to
/// reach a target precision among accepted predictions.
pub struct AdaptiveThreshold {
    window_size: usize,
    outcomes: Vec<Outcome>,
}

impl AdaptiveThreshold {
    pub fn new() -> Self {
        Self::with_window(100)
    }

    pub fn with_window(window_size: usize) -> Self {
        Self {
            window_size,
            outcomes: Vec::new(),
        }
    }

    /// Record whether a prediction at the given confidence was correct.
    /// The oldest outcome is evicted once the window is full.
    pub fn record_outcome(&mut self, prediction: &str, confidence: f64, was_correct: bool) {
        self.outcomes.push(Outcome {
            prediction: prediction.to_string(),
            confidence,
            was_correct,
        });
        if self.outcomes.len() > self.window_size {
            self.outcomes.remove(0);
        }
    }

    pub fn sample_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Lowest recorded confidence at which the fraction of correct
    /// predictions at or above it meets the target.
    ///
    /// Returns 0.5 with fewer than 10 samples, and a conservative 0.9
    /// when no recorded confidence reaches the target.
    pub fn threshold(&self, target_specificity: f64) -> f64 {
        if self.outcomes.len() < 10 {
            return 0.5;
        }

        let mut sorted: Vec<&Outcome> = self.outcomes.iter().collect();
        sorted.sort_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for candidate in sorted {
            let at_or_above: Vec<&Outcome> = self
                .outcomes
                .iter()
                .filter(|o| o.confidence >= candidate.confidence)
                .collect();
            let correct = at_or_above.iter().filter(|o| o.was_correct).count();

            if !at_or_above.is_empty()
                && correct as f64 / at_or_above.len() as f64 >= target_specificity
            {
                return candidate.confidence;
            }
        }

        0.9
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_samples_default_to_half() {
        let mut calc = AdaptiveThreshold::new();
        for i in 0..9 {
            calc.record_outcome("dx", 0.1 * i as f64, true);
        }
        assert_eq!(calc.threshold(0.95), 0.5);
    }

    #[test]
    fn all_correct_history_accepts_lowest_confidence() {
        let mut calc = AdaptiveThreshold::new();
        for i in 0..20 {
            calc.record_outcome("dx", 0.3 + 0.03 * i as f64, true);
        }
        assert!((calc.threshold(0.95) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn unreachable_target_falls_back_conservative() {
        let mut calc = AdaptiveThreshold::new();
        for i in 0..20 {
            calc.record_outcome("dx", 0.3 + 0.03 * i as f64, false);
        }
        assert!((calc.threshold(0.95) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn threshold_rises_above_unreliable_low_confidence() {
        let mut calc = AdaptiveThreshold::new();
        // Below 0.7 predictions are wrong, above they are right.
        for i in 0..10 {
            calc.record_outcome("dx", 0.4 + 0.02 * i as f64, false);
        }
        for i in 0..10 {
            calc.record_outcome("dx", 0.7 + 0.02 * i as f64, true);
        }
        let threshold = calc.threshold(0.95);
        assert!(threshold >= 0.7);
    }

    #[test]
    fn window_evicts_oldest_outcome() {
        let mut calc = AdaptiveThreshold::with_window(5);
        for i in 0..8 {
            calc.record_outcome("dx", 0.1 * i as f64, true);
        }
        assert_eq!(calc.sample_count(), 5);
    }
}
