//! Error types for heston-rs.
//!
//! A single `thiserror`-derived enum covers precondition failures, domain
//! violations of model parameters, and the numerical failures of the
//! quadrature and least-squares layers. The `ensure!`, `ensure_post!` and
//! `fail!` macros are the usual way of producing the general variants.

use crate::Real;
use thiserror::Error;

/// The top-level error type used throughout heston-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A model parameter lies outside its admissible domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: Real,
        /// Which bound was violated.
        reason: String,
    },

    /// Numerical integration did not reach the requested tolerance within
    /// its evaluation budget.
    #[error(
        "integration did not converge: estimate {estimate}, error bound {error_bound:e} \
         against tolerance {tolerance:e} after {evaluations} evaluations"
    )]
    Integration {
        /// Best estimate available when the budget ran out.
        estimate: Real,
        /// Achieved error bound.
        error_bound: Real,
        /// Tolerance the bound had to meet.
        tolerance: Real,
        /// Number of integrand evaluations spent.
        evaluations: usize,
    },

    /// The damped normal equations could not be solved.
    #[error("singular jacobian at iteration {iterations}: damped normal equations not solvable")]
    SingularJacobian {
        /// Iterations completed before the failure.
        iterations: usize,
    },

    /// The objective became NaN or infinite.
    #[error("non-finite cost {cost} at iteration {iterations}")]
    NonFiniteCost {
        /// Iterations completed before the failure.
        iterations: usize,
        /// The offending cost value.
        cost: Real,
    },
}

/// Shorthand `Result` type used throughout heston-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use heston_core::{ensure, errors::Error};
/// fn positive(x: f64) -> heston_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ).into());
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use heston_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> heston_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ).into());
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use heston_core::{fail, errors::Error};
/// fn always_err() -> heston_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)).into())
    };
}
