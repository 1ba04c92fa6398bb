//! Least-squares optimisation framework.
//!
//! Provides the residual-vector [`CostFunction`] abstraction, the
//! [`BoxConstraint`] parameter domain, a box-aware finite-difference
//! [`DifferenceStencil`], [`EndCriteria`], and the projected
//! [`LevenbergMarquardt`] optimiser.

pub mod levenberg_marquardt;

pub use levenberg_marquardt::LevenbergMarquardt;

use crate::{array::Array, matrix::Matrix};
use heston_core::{
    ensure,
    errors::{Error, Result},
    Real,
};

// ── Cost function trait ───────────────────────────────────────────────────────

/// A multi-dimensional least-squares objective.
///
/// The optimiser minimises `Σ rᵢ(x)²` over the residual vector returned by
/// [`values`](CostFunction::values).
pub trait CostFunction {
    /// Evaluate the residual vector at `x`.
    fn values(&self, x: &Array) -> Result<Array>;

    /// Return the scalar cost `Σ rᵢ(x)²`.
    fn value(&self, x: &Array) -> Result<Real> {
        Ok(self.values(x)?.norm_squared())
    }

    /// Jacobian of the residuals (`residuals × parameters`), by finite
    /// differences that never leave `bounds`.
    ///
    /// Implementations may override this to evaluate the columns
    /// concurrently; each column is independent.
    fn jacobian(
        &self,
        x: &Array,
        bounds: &BoxConstraint,
        stencil: &DifferenceStencil,
    ) -> Result<Matrix> {
        let columns = (0..x.size())
            .map(|j| stencil.column(self, x, bounds, j))
            .collect::<Result<Vec<_>>>()?;
        Ok(Matrix::from_columns(&columns))
    }
}

// ── Constraints ───────────────────────────────────────────────────────────────

/// Componentwise bounds `lower[j] ≤ x[j] ≤ upper[j]`.
///
/// Infinite bounds are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxConstraint {
    lower: Array,
    upper: Array,
}

impl BoxConstraint {
    /// Create a box from its lower and upper corners.
    pub fn new(lower: Array, upper: Array) -> Result<Self> {
        ensure!(
            lower.size() == upper.size(),
            "bound sizes differ: {} lower vs {} upper",
            lower.size(),
            upper.size()
        );
        for j in 0..lower.size() {
            ensure!(
                lower[j] <= upper[j],
                "empty range for parameter {j}: [{}, {}]",
                lower[j],
                upper[j]
            );
        }
        Ok(Self { lower, upper })
    }

    /// The unbounded box in `n` dimensions.
    pub fn unbounded(n: usize) -> Self {
        Self {
            lower: Array::from_element(n, Real::NEG_INFINITY),
            upper: Array::from_element(n, Real::INFINITY),
        }
    }

    /// Number of dimensions.
    pub fn size(&self) -> usize {
        self.lower.size()
    }

    /// Lower corner.
    pub fn lower(&self) -> &Array {
        &self.lower
    }

    /// Upper corner.
    pub fn upper(&self) -> &Array {
        &self.upper
    }

    /// Return `true` if `x` lies inside the box (bounds included).
    pub fn test(&self, x: &Array) -> bool {
        x.size() == self.size()
            && (0..x.size()).all(|j| x[j] >= self.lower[j] && x[j] <= self.upper[j])
    }

    /// Clip `x` componentwise onto the box.
    pub fn project(&self, x: &Array) -> Array {
        (0..x.size())
            .map(|j| x[j].max(self.lower[j]).min(self.upper[j]))
            .collect()
    }
}

// ── Finite differences ────────────────────────────────────────────────────────

/// Central-difference stencil with a relative step, falling back to a
/// one-sided difference where a perturbation would leave the box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifferenceStencil {
    /// Step relative to the parameter's magnitude.
    pub relative_step: Real,
    /// Magnitude below which the step stops shrinking.
    pub scale_floor: Real,
}

impl Default for DifferenceStencil {
    fn default() -> Self {
        Self {
            relative_step: 1e-5,
            scale_floor: 1e-2,
        }
    }
}

impl DifferenceStencil {
    /// Step used for coordinate value `xj`.
    pub fn step(&self, xj: Real) -> Real {
        self.relative_step * xj.abs().max(self.scale_floor)
    }

    /// The forward and backward points for coordinate `j`, both inside
    /// `bounds`.
    ///
    /// A perturbation that would cross a bound is replaced by `x` itself.
    pub fn points(&self, x: &Array, bounds: &BoxConstraint, j: usize) -> (Array, Array) {
        let h = self.step(x[j]);
        let mut up = x.clone();
        let mut down = x.clone();
        if x[j] + h <= bounds.upper()[j] {
            up[j] = x[j] + h;
        }
        if x[j] - h >= bounds.lower()[j] {
            down[j] = x[j] - h;
        }
        (up, down)
    }

    /// Finite-difference derivative of the residuals along coordinate `j`.
    pub fn column<C: CostFunction + ?Sized>(
        &self,
        cost: &C,
        x: &Array,
        bounds: &BoxConstraint,
        j: usize,
    ) -> Result<Array> {
        let (up, down) = self.points(x, bounds, j);
        let width = up[j] - down[j];
        let f_up = cost.values(&up)?;
        if width <= 0.0 {
            return Ok(Array::zeros(f_up.size()));
        }
        let f_down = cost.values(&down)?;
        Ok(&(&f_up - &f_down) * (1.0 / width))
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Criteria to stop an optimisation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Maximum number of consecutive iterations without an accepted step.
    pub max_stationary_state_iterations: usize,
    /// Stop when the cost `Σr²` drops to this value.
    pub root_epsilon: Real,
    /// Stop when an accepted step improves the cost by at most this
    /// fraction of its previous value.
    pub function_epsilon: Real,
    /// Stop when `‖Jᵗr‖∞` drops to this value.
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Create new end criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Result<Self> {
        ensure!(max_iterations > 0, "max_iterations must be positive");
        ensure!(
            max_stationary_state_iterations > 0,
            "max_stationary_state_iterations must be positive"
        );
        for (name, eps) in [
            ("root_epsilon", root_epsilon),
            ("function_epsilon", function_epsilon),
            ("gradient_norm_epsilon", gradient_norm_epsilon),
        ] {
            ensure!(eps >= 0.0 && eps.is_finite(), "{name} must be non-negative, got {eps}");
        }
        Ok(Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        })
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// The reason an optimisation terminated normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCriteriaType {
    /// Maximum iterations reached.
    MaxIterations,
    /// Cost at or below root epsilon.
    RootEpsilon,
    /// Relative cost improvement at or below function epsilon.
    FunctionEpsilon,
    /// Gradient norm at or below gradient norm epsilon.
    GradientNormEpsilon,
    /// Too many consecutive iterations without an accepted step.
    StationaryPoint,
    /// Stopped by the caller between iterations.
    Cancelled,
}

impl EndCriteriaType {
    /// Return `true` for the three tolerance-based stops.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Self::RootEpsilon | Self::FunctionEpsilon | Self::GradientNormEpsilon
        )
    }
}

/// Result of a successful optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Final parameter values.
    pub x: Array,
    /// Final cost `Σr²`.
    pub value: Real,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Reason for termination.
    pub end_type: EndCriteriaType,
    /// Cost after the initial evaluation and after every accepted step.
    pub cost_history: Vec<Real>,
}

/// An optimisation that ended in error, with the state it had reached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error} (after {iterations} iterations, cost {value:e})")]
pub struct OptimizationFailure {
    /// What went wrong.
    #[source]
    pub error: Error,
    /// Last accepted parameters.
    pub x: Array,
    /// Last accepted cost.
    pub value: Real,
    /// Iterations completed.
    pub iterations: usize,
}
