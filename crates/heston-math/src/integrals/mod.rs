//! Numerical integration.
//!
//! The Heston engine needs a rule that reports its own error so that
//! non-convergence surfaces as [`Error::Integration`] instead of a silently
//! wrong price; [`GaussKronrodAdaptive`] is that rule.
//!
//! [`Error::Integration`]: heston_core::errors::Error::Integration

pub mod gauss_kronrod;

pub use gauss_kronrod::GaussKronrodAdaptive;

use heston_core::Real;

/// An integral estimate together with the bookkeeping needed to judge it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationOutcome {
    /// The integral estimate.
    pub value: Real,
    /// Achieved absolute error estimate.
    pub error_estimate: Real,
    /// Number of integrand evaluations spent.
    pub evaluations: usize,
}

impl IntegrationOutcome {
    /// The outcome of integrating over an empty interval.
    pub const ZERO: Self = Self {
        value: 0.0,
        error_estimate: 0.0,
        evaluations: 0,
    };

    /// Combine the outcomes of two adjacent intervals.
    pub fn merge(self, other: Self) -> Self {
        Self {
            value: self.value + other.value,
            error_estimate: self.error_estimate + other.error_estimate,
            evaluations: self.evaluations + other.evaluations,
        }
    }
}
