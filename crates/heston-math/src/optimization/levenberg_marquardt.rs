//! Projected Levenberg–Marquardt least squares.
//!
//! Each iteration solves the damped normal equations
//! `(JᵗJ + λ·D)·Δ = −Jᵗr` by Cholesky factorisation and projects `x + Δ`
//! back onto the box. `D` is the running maximum of `diag(JᵗJ)` (Moré's
//! scaling), so the damping is invariant to the units of each parameter.
//! `λ` is updated from the gain ratio of actual to predicted reduction
//! (Nielsen's rule) on acceptance and grows geometrically on rejection.
//!
//! Parameters resting on a bound whose gradient pushes outward are frozen
//! for the step.

use super::{
    BoxConstraint, CostFunction, DifferenceStencil, EndCriteria, EndCriteriaType,
    OptimizationFailure, OptimizationResult,
};
use crate::{array::Array, matrix::Matrix};
use heston_core::{errors::Error, Real};
use tracing::{debug, trace};

/// Levenberg–Marquardt optimiser settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevenbergMarquardt {
    /// Damping factor `λ` at the first iteration.
    pub initial_damping: Real,
    /// Rejected trial steps allowed per iteration before it counts as
    /// stationary.
    pub max_damping_retries: usize,
    /// Upper cap on `λ` and its growth factor.
    pub max_damping: Real,
    /// Finite-difference stencil for the Jacobian.
    pub stencil: DifferenceStencil,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            initial_damping: 1e-3,
            max_damping_retries: 12,
            max_damping: 1e16,
            stencil: DifferenceStencil::default(),
        }
    }
}

/// Mutable state of one `minimize` call.
struct LmState {
    x: Array,
    residuals: Array,
    cost: Real,
    damping: Real,
    growth: Real,
    scale: Array,
    iterations: usize,
    stationary: usize,
    cost_history: Vec<Real>,
}

impl LmState {
    fn finish(self, end_type: EndCriteriaType) -> OptimizationResult {
        OptimizationResult {
            x: self.x,
            value: self.cost,
            iterations: self.iterations,
            end_type,
            cost_history: self.cost_history,
        }
    }

    fn fail(&self, error: Error) -> OptimizationFailure {
        OptimizationFailure {
            error,
            x: self.x.clone(),
            value: self.cost,
            iterations: self.iterations,
        }
    }

    fn reject(&mut self, max_damping: Real) {
        self.damping = (self.damping * self.growth).min(max_damping);
        self.growth = (2.0 * self.growth).min(max_damping);
    }
}

/// What became of one iteration's trial steps.
enum StepOutcome {
    Accepted { previous_cost: Real },
    Rejected,
    Singular,
    NonFinite(Real),
}

impl LevenbergMarquardt {
    /// Create an optimiser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial damping factor.
    pub fn with_initial_damping(mut self, damping: Real) -> Self {
        self.initial_damping = damping;
        self
    }

    /// Set the number of trial steps per iteration.
    pub fn with_max_damping_retries(mut self, retries: usize) -> Self {
        self.max_damping_retries = retries.max(1);
        self
    }

    /// Set the finite-difference stencil.
    pub fn with_stencil(mut self, stencil: DifferenceStencil) -> Self {
        self.stencil = stencil;
        self
    }

    /// Minimise `Σ rᵢ(x)²` over `constraint`, starting from the projection
    /// of `initial` onto it.
    pub fn minimize<C: CostFunction + ?Sized>(
        &self,
        cost: &C,
        constraint: &BoxConstraint,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult, OptimizationFailure> {
        self.minimize_until(cost, constraint, initial, end_criteria, || false)
    }

    /// Like [`minimize`](Self::minimize), but polls `should_stop` at every
    /// iteration boundary and returns the best point so far with
    /// [`EndCriteriaType::Cancelled`] once it reports `true`.
    pub fn minimize_until<C, S>(
        &self,
        cost: &C,
        constraint: &BoxConstraint,
        initial: &Array,
        end_criteria: &EndCriteria,
        should_stop: S,
    ) -> Result<OptimizationResult, OptimizationFailure>
    where
        C: CostFunction + ?Sized,
        S: Fn() -> bool,
    {
        let x = constraint.project(initial);
        let n = x.size();
        if n != constraint.size() {
            return Err(OptimizationFailure {
                error: Error::InvalidArgument(format!(
                    "{n} parameters but a {}-dimensional constraint",
                    constraint.size()
                )),
                x,
                value: Real::NAN,
                iterations: 0,
            });
        }
        let residuals = match cost.values(&x) {
            Ok(r) => r,
            Err(error) => {
                return Err(OptimizationFailure {
                    error,
                    x,
                    value: Real::NAN,
                    iterations: 0,
                })
            }
        };
        let initial_cost = residuals.norm_squared();
        let mut state = LmState {
            x,
            residuals,
            cost: initial_cost,
            damping: self.initial_damping,
            growth: 2.0,
            scale: Array::zeros(n),
            iterations: 0,
            stationary: 0,
            cost_history: vec![initial_cost],
        };
        if !initial_cost.is_finite() {
            return Err(state.fail(Error::NonFiniteCost {
                iterations: 0,
                cost: initial_cost,
            }));
        }

        // Jacobian and gradient at state.x, kept while no step is accepted
        let mut linearisation: Option<(Matrix, Array)> = None;
        loop {
            if should_stop() {
                return Ok(state.finish(EndCriteriaType::Cancelled));
            }
            if state.cost <= end_criteria.root_epsilon {
                return Ok(state.finish(EndCriteriaType::RootEpsilon));
            }
            if state.iterations >= end_criteria.max_iterations {
                return Ok(state.finish(EndCriteriaType::MaxIterations));
            }

            let (jacobian, gradient) = match linearisation.take() {
                Some(kept) => kept,
                None => {
                    let mut jacobian = cost
                        .jacobian(&state.x, constraint, &self.stencil)
                        .map_err(|e| state.fail(e))?;
                    if !jacobian.is_finite() {
                        return Err(state.fail(Error::NonFiniteCost {
                            iterations: state.iterations,
                            cost: state.cost,
                        }));
                    }
                    let mut gradient = jacobian.transpose_mul_vec(&state.residuals);
                    freeze_active_bounds(&state.x, constraint, &mut jacobian, &mut gradient);
                    if gradient.norm_inf() <= end_criteria.gradient_norm_epsilon {
                        return Ok(state.finish(EndCriteriaType::GradientNormEpsilon));
                    }
                    (jacobian, gradient)
                }
            };

            let outcome = self
                .step(cost, constraint, &mut state, &jacobian, &gradient)
                .map_err(|e| state.fail(e))?;

            match outcome {
                StepOutcome::Accepted { previous_cost } => {
                    state.iterations += 1;
                    state.stationary = 0;
                    debug!(
                        iteration = state.iterations,
                        cost = state.cost,
                        damping = state.damping,
                        "accepted step"
                    );
                    if state.cost <= end_criteria.root_epsilon {
                        return Ok(state.finish(EndCriteriaType::RootEpsilon));
                    }
                    if previous_cost - state.cost <= end_criteria.function_epsilon * previous_cost {
                        return Ok(state.finish(EndCriteriaType::FunctionEpsilon));
                    }
                }
                StepOutcome::Singular => {
                    let iterations = state.iterations;
                    return Err(state.fail(Error::SingularJacobian { iterations }));
                }
                StepOutcome::NonFinite(cost) => {
                    let iterations = state.iterations;
                    return Err(state.fail(Error::NonFiniteCost { iterations, cost }));
                }
                StepOutcome::Rejected => {
                    state.iterations += 1;
                    state.stationary += 1;
                    trace!(
                        iteration = state.iterations,
                        stationary = state.stationary,
                        damping = state.damping,
                        "no acceptable step"
                    );
                    if state.stationary >= end_criteria.max_stationary_state_iterations {
                        return Ok(state.finish(EndCriteriaType::StationaryPoint));
                    }
                    linearisation = Some((jacobian, gradient));
                }
            }
        }
    }

    /// Try damped steps until one lowers the cost or the retries run out.
    fn step<C: CostFunction + ?Sized>(
        &self,
        cost: &C,
        constraint: &BoxConstraint,
        state: &mut LmState,
        jacobian: &Matrix,
        gradient: &Array,
    ) -> heston_core::Result<StepOutcome> {
        let n = gradient.size();
        let normal = jacobian.gram();
        for j in 0..n {
            state.scale[j] = state.scale[j].max(normal[(j, j)]);
        }
        let rhs = -gradient;

        let mut singular = 0;
        let mut non_finite = 0;
        let mut last_non_finite = Real::NAN;
        for _ in 0..self.max_damping_retries {
            let mut damped = normal.clone();
            for j in 0..n {
                let d = if state.scale[j] > 0.0 { state.scale[j] } else { 1.0 };
                damped[(j, j)] += state.damping * d;
            }
            let delta = if damped.is_finite() {
                damped.cholesky_solve(&rhs)
            } else {
                None
            };
            let Some(delta) = delta else {
                singular += 1;
                state.reject(self.max_damping);
                continue;
            };

            let trial = constraint.project(&(&state.x + &delta));
            let residuals = cost.values(&trial)?;
            let trial_cost = residuals.norm_squared();
            if !trial_cost.is_finite() {
                non_finite += 1;
                last_non_finite = trial_cost;
                state.reject(self.max_damping);
                continue;
            }
            if trial_cost < state.cost {
                let predicted =
                    -2.0 * delta.dot(gradient) - delta.dot(&normal.mul_vec(&delta));
                let gain = if predicted > 0.0 {
                    (state.cost - trial_cost) / predicted
                } else {
                    0.0
                };
                state.damping *= (1.0 / 3.0_f64).max(1.0 - (2.0 * gain - 1.0).powi(3));
                state.growth = 2.0;
                let previous_cost = state.cost;
                state.x = trial;
                state.residuals = residuals;
                state.cost = trial_cost;
                state.cost_history.push(trial_cost);
                return Ok(StepOutcome::Accepted { previous_cost });
            }
            state.reject(self.max_damping);
        }

        Ok(if singular == self.max_damping_retries {
            StepOutcome::Singular
        } else if non_finite > 0 && singular + non_finite == self.max_damping_retries {
            StepOutcome::NonFinite(last_non_finite)
        } else {
            StepOutcome::Rejected
        })
    }
}

/// Zero the Jacobian column and gradient entry of every parameter that sits
/// on a bound with the descent direction pointing out of the box.
fn freeze_active_bounds(
    x: &Array,
    constraint: &BoxConstraint,
    jacobian: &mut Matrix,
    gradient: &mut Array,
) {
    for j in 0..x.size() {
        let at_lower = x[j] <= constraint.lower()[j] && gradient[j] > 0.0;
        let at_upper = x[j] >= constraint.upper()[j] && gradient[j] < 0.0;
        if at_lower || at_upper {
            jacobian.zero_column(j);
            gradient[j] = 0.0;
        }
    }
}
