//! # heston-math
//!
//! Numerical building blocks for heston-rs: array/matrix newtypes (over
//! nalgebra), the normal distribution (via statrs), adaptive Gauss–Kronrod
//! quadrature, Brent root finding, and a box-constrained
//! Levenberg–Marquardt least-squares optimiser.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// One-dimensional `Array` type.
pub mod array;

/// Two-dimensional `Matrix` type.
pub mod matrix;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// Least-squares optimisation.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use distributions::normal_cdf;
pub use matrix::Matrix;
