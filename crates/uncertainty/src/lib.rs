//! Uncertainty quantification for clinical predictions.
//!
//! Splits prediction uncertainty into two components:
//!
//! - **epistemic** — what the model doesn't know, estimated as the
//!   normalized variance of the softmax distribution
//! - **aleatoric** — what the data can't tell apart, estimated as the
//!   normalized entropy of the distribution
//!
//! A bootstrap percentile interval over candidate confidences gives a
//! range, and [`AdaptiveThreshold`] derives a confidence cutoff from
//! observed prediction outcomes.

pub mod quantifier;
pub mod threshold;

pub use quantifier::{CalibrationMetrics, RiskLevel, UncertaintyEstimate, UncertaintyQuantifier};
pub use threshold::AdaptiveThreshold;
