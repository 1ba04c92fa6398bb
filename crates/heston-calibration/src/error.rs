//! Calibration failures.
//!
//! Running out of iterations, stalling, and cancellation are statuses of a
//! successful [`CalibrationOutcome`](crate::CalibrationOutcome); the
//! variants here are the runs that produced no usable fit.

use heston_core::{errors::Error, Real, Size};
use heston_math::optimization::OptimizationFailure;
use heston_models::HestonParameters;
use thiserror::Error;

/// A calibration that ended in error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Every damped system of an iteration failed to factorise.
    #[error("singular Jacobian after {iterations} iterations (cost {cost:e}, parameters {parameters})")]
    SingularJacobian {
        /// Iterations completed.
        iterations: Size,
        /// Last accepted cost.
        cost: Real,
        /// Last accepted parameters.
        parameters: HestonParameters,
    },

    /// The cost or its Jacobian became NaN or infinite.
    #[error("calibration diverged after {iterations} iterations (cost {cost}, parameters {parameters})")]
    Diverged {
        /// Iterations completed.
        iterations: Size,
        /// Last accepted cost.
        cost: Real,
        /// Last accepted parameters.
        parameters: HestonParameters,
    },

    /// A helper could not be priced.
    #[error("pricing failed after {iterations} iterations: {source}")]
    Pricing {
        /// The pricing error.
        #[source]
        source: Error,
        /// Iterations completed.
        iterations: Size,
        /// Last accepted cost.
        cost: Real,
        /// Last accepted parameters.
        parameters: HestonParameters,
    },

    /// The calibration could not start.
    #[error("invalid calibration input: {0}")]
    InvalidInput(#[source] Error),
}

impl CalibrationError {
    /// Iterations completed before the failure, if the optimiser ran.
    pub fn iterations(&self) -> Option<Size> {
        match self {
            Self::SingularJacobian { iterations, .. }
            | Self::Diverged { iterations, .. }
            | Self::Pricing { iterations, .. } => Some(*iterations),
            Self::InvalidInput(_) => None,
        }
    }

    /// The last accepted parameters, if the optimiser ran.
    pub fn parameters(&self) -> Option<&HestonParameters> {
        match self {
            Self::SingularJacobian { parameters, .. }
            | Self::Diverged { parameters, .. }
            | Self::Pricing { parameters, .. } => Some(parameters),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<OptimizationFailure> for CalibrationError {
    fn from(failure: OptimizationFailure) -> Self {
        let parameters = match HestonParameters::from_array(&failure.x) {
            Ok(p) => p,
            Err(e) => return Self::InvalidInput(e),
        };
        let cost = failure.value;
        match failure.error {
            Error::SingularJacobian { iterations } => Self::SingularJacobian {
                iterations,
                cost,
                parameters,
            },
            Error::NonFiniteCost { iterations, .. } => Self::Diverged {
                iterations,
                cost,
                parameters,
            },
            source => Self::Pricing {
                source,
                iterations: failure.iterations,
                cost,
                parameters,
            },
        }
    }
}
