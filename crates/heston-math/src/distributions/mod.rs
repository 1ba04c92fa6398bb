//! Probability distributions.
//!
//! Only the standard normal is needed by the Black formula; it delegates to
//! the `statrs` crate's error function.

pub mod normal;

pub use normal::normal_cdf;
