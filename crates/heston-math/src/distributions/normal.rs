//! Standard normal distribution.
//!
//! Wraps `statrs`'s complementary error function, which keeps full relative
//! precision far into the lower tail where `1 − Φ(−x)` would cancel.

use heston_core::Real;
use statrs::function::erf::erfc;
use std::f64::consts::FRAC_1_SQRT_2;

/// The standard normal cumulative distribution function Φ(x).
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}
