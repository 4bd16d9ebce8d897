// marksman-scoring/src/relevance/mod.rs
//! The relevance gate.
//!
//! Answers whose relevance falls below the threshold are graded zero without
//! ever reaching the combiner, so accidental keyword collisions in an
//! off-topic answer cannot earn marks.

use log::debug;

use crate::policy::ScoringPolicy;

/// Outcome of the relevance check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Pass { relevance: f64 },
    Reject { relevance: f64, threshold: f64 },
}

impl GateDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, GateDecision::Reject { .. })
    }

    pub fn relevance(&self) -> f64 {
        match *self {
            GateDecision::Pass { relevance } | GateDecision::Reject { relevance, .. } => relevance,
        }
    }
}

/// Threshold check on the [0, 100] relevance scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceGate {
    threshold: f64,
}

impl RelevanceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_policy(policy: &ScoringPolicy) -> Self {
        Self::new(policy.relevance_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rejects anything strictly below the threshold. NaN is rejected too.
    pub fn evaluate(&self, relevance: f64) -> GateDecision {
        if relevance >= self.threshold {
            GateDecision::Pass { relevance }
        } else {
            debug!("Relevance {:.2} below threshold {:.2}; short-circuiting.", relevance, self.threshold);
            GateDecision::Reject { relevance, threshold: self.threshold }
        }
    }
}

impl Default for RelevanceGate {
    fn default() -> Self {
        Self::from_policy(&ScoringPolicy::default())
    }
}
