//! `HestonParameters` — `{v0, κ, θ, σ, ρ}` and their admissible domain.
//!
//! Construction does not validate, so an optimiser may hold any point;
//! [`validate`](HestonParameters::validate) and
//! [`project`](HestonParameters::project) enforce the domain when needed.
//! The Feller condition is reported, never enforced.

use heston_core::{
    errors::{Error, Result},
    Real,
};
use heston_math::{optimization::BoxConstraint, Array};
use std::fmt;

/// Heston model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParameters {
    /// Initial variance, `≥ 0`.
    pub v0: Real,
    /// Mean-reversion speed, `≥ 0`.
    pub kappa: Real,
    /// Long-run variance, `≥ 0`.
    pub theta: Real,
    /// Volatility of variance, `≥ 0`.
    pub sigma: Real,
    /// Spot/variance correlation, in `[-1, 1]`.
    pub rho: Real,
}

impl HestonParameters {
    /// Number of free parameters.
    pub const SIZE: usize = 5;

    /// Parameter names in vector order.
    pub const NAMES: [&'static str; Self::SIZE] = ["v0", "kappa", "theta", "sigma", "rho"];

    const LOWER: [Real; Self::SIZE] = [0.0, 0.0, 0.0, 0.0, -1.0];
    const UPPER: [Real; Self::SIZE] = [
        Real::INFINITY,
        Real::INFINITY,
        Real::INFINITY,
        Real::INFINITY,
        1.0,
    ];

    /// Create a parameter set; no validation is performed.
    pub fn new(v0: Real, kappa: Real, theta: Real, sigma: Real, rho: Real) -> Self {
        Self {
            v0,
            kappa,
            theta,
            sigma,
            rho,
        }
    }

    /// Values in the fixed order `[v0, kappa, theta, sigma, rho]`.
    pub fn values(&self) -> [Real; Self::SIZE] {
        [self.v0, self.kappa, self.theta, self.sigma, self.rho]
    }

    /// Build from values in the order of [`values`](Self::values).
    pub fn from_values(v: [Real; Self::SIZE]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4])
    }

    /// The parameter vector as an [`Array`].
    pub fn to_array(&self) -> Array {
        Array::from_slice(&self.values())
    }

    /// Read a parameter vector produced by [`to_array`](Self::to_array).
    pub fn from_array(x: &Array) -> Result<Self> {
        let v: [Real; Self::SIZE] = x.as_slice().try_into().map_err(|_| {
            Error::InvalidArgument(format!(
                "expected {} Heston parameters, got {}",
                Self::SIZE,
                x.size()
            ))
        })?;
        Ok(Self::from_values(v))
    }

    /// The admissible domain as a box in vector order.
    pub fn bounds() -> Result<BoxConstraint> {
        BoxConstraint::new(
            Array::from_slice(&Self::LOWER),
            Array::from_slice(&Self::UPPER),
        )
    }

    /// Check the domain, naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for ((name, value), (lo, hi)) in Self::NAMES
            .into_iter()
            .zip(self.values())
            .zip(Self::LOWER.into_iter().zip(Self::UPPER))
        {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite".into(),
                });
            }
            if value < lo || value > hi {
                let reason = if hi.is_finite() {
                    format!("must lie in [{lo}, {hi}]")
                } else {
                    "must be non-negative".to_string()
                };
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Return `true` if `2κθ ≥ σ²`, i.e. the variance process cannot
    /// reach zero.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    /// Clip each field onto its domain.
    pub fn project(&self) -> Self {
        let mut v = self.values();
        for (j, x) in v.iter_mut().enumerate() {
            *x = x.max(Self::LOWER[j]).min(Self::UPPER[j]);
        }
        Self::from_values(v)
    }
}

impl fmt::Display for HestonParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v0 = {:.6}, kappa = {:.6}, theta = {:.6}, sigma = {:.6}, rho = {:.6}",
            self.v0, self.kappa, self.theta, self.sigma, self.rho
        )
    }
}
