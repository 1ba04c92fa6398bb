//! `HestonCalibrator` — least-squares fit of the Heston parameters.
//!
//! The residual of helper `i` is its pricing error `eᵢ = model − market`,
//! divided by the market price under [`ErrorWeighting::Relative`]. The
//! optimiser works on the vector `[v0, kappa, theta, sigma, rho]` inside
//! the Heston domain box.

use crate::{
    calibration_helper::CalibrationHelper, cancellation::CancellationToken, error::CalibrationError,
};
use heston_core::{
    errors::{Error, Result},
    Real, Size,
};
use heston_math::{
    optimization::{
        BoxConstraint, CostFunction, DifferenceStencil, EndCriteria, EndCriteriaType,
        LevenbergMarquardt,
    },
    Array, Matrix,
};
use heston_models::HestonParameters;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fmt;
use tracing::{info, warn};

// ── Settings ──────────────────────────────────────────────────────────────────

/// How pricing errors are scaled into residuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorWeighting {
    /// `model − market`.
    #[default]
    Absolute,
    /// `(model − market) / market`.
    Relative,
}

/// Why a calibration stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceStatus {
    /// A tolerance was met; carries which one.
    Converged(EndCriteriaType),
    /// The iteration budget ran out.
    MaxIterationsExceeded,
    /// Too many consecutive iterations without an accepted step.
    StationaryPoint,
    /// Stopped through a [`CancellationToken`].
    Cancelled,
}

impl ConvergenceStatus {
    /// Return `true` if a tolerance was met.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }
}

impl From<EndCriteriaType> for ConvergenceStatus {
    fn from(end: EndCriteriaType) -> Self {
        match end {
            EndCriteriaType::MaxIterations => Self::MaxIterationsExceeded,
            EndCriteriaType::StationaryPoint => Self::StationaryPoint,
            EndCriteriaType::Cancelled => Self::Cancelled,
            converged => Self::Converged(converged),
        }
    }
}

impl fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged(end) => write!(f, "converged ({end:?})"),
            Self::MaxIterationsExceeded => f.write_str("max iterations exceeded"),
            Self::StationaryPoint => f.write_str("stationary point"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// The fitted parameters and how the search ended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationOutcome {
    /// Best parameters found.
    pub parameters: HestonParameters,
    /// Termination reason.
    pub status: ConvergenceStatus,
    /// Iterations performed.
    pub iterations: Size,
    /// Final cost `Σ rᵢ²`.
    pub cost: Real,
    /// Cost at the start and after every accepted step.
    pub cost_history: Vec<Real>,
    /// Whether the fitted set satisfies `2κθ ≥ σ²`.
    pub feller_satisfied: bool,
}

// ── Cost function ─────────────────────────────────────────────────────────────

struct HelperResiduals<'a> {
    helpers: &'a [CalibrationHelper],
    weighting: ErrorWeighting,
}

impl HelperResiduals<'_> {
    fn residual(&self, helper: &CalibrationHelper, params: &HestonParameters) -> Result<Real> {
        let error = helper.calibration_error(params)?;
        Ok(match self.weighting {
            ErrorWeighting::Absolute => error,
            ErrorWeighting::Relative => error / helper.market_price(),
        })
    }
}

impl CostFunction for HelperResiduals<'_> {
    fn values(&self, x: &Array) -> Result<Array> {
        let params = HestonParameters::from_array(x)?;
        #[cfg(feature = "parallel")]
        let residuals = self
            .helpers
            .par_iter()
            .map(|h| self.residual(h, &params))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let residuals = self
            .helpers
            .iter()
            .map(|h| self.residual(h, &params))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array::from_vec(residuals))
    }

    fn jacobian(
        &self,
        x: &Array,
        bounds: &BoxConstraint,
        stencil: &DifferenceStencil,
    ) -> Result<Matrix> {
        #[cfg(feature = "parallel")]
        let columns = (0..x.size())
            .into_par_iter()
            .map(|j| stencil.column(self, x, bounds, j))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let columns = (0..x.size())
            .map(|j| stencil.column(self, x, bounds, j))
            .collect::<Result<Vec<_>>>()?;
        Ok(Matrix::from_columns(&columns))
    }
}

// ── Calibrator ────────────────────────────────────────────────────────────────

/// Levenberg–Marquardt calibrator for the Heston model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonCalibrator {
    optimizer: LevenbergMarquardt,
    weighting: ErrorWeighting,
}

impl HestonCalibrator {
    /// A calibrator with default optimiser settings and absolute errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given optimiser settings.
    pub fn with_optimizer(mut self, optimizer: LevenbergMarquardt) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Use the given error weighting.
    pub fn with_weighting(mut self, weighting: ErrorWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// The optimiser settings.
    pub fn optimizer(&self) -> &LevenbergMarquardt {
        &self.optimizer
    }

    /// The error weighting.
    pub fn weighting(&self) -> ErrorWeighting {
        self.weighting
    }

    /// Fit the model to `helpers`, starting from `initial`.
    pub fn calibrate(
        &self,
        initial: &HestonParameters,
        helpers: &[CalibrationHelper],
        criteria: &EndCriteria,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        self.calibrate_with_cancellation(initial, helpers, criteria, &CancellationToken::new())
    }

    /// Like [`calibrate`](Self::calibrate), stopping with
    /// [`ConvergenceStatus::Cancelled`] and the best parameters so far once
    /// `token` is cancelled.
    pub fn calibrate_with_cancellation(
        &self,
        initial: &HestonParameters,
        helpers: &[CalibrationHelper],
        criteria: &EndCriteria,
        token: &CancellationToken,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        self.check_inputs(initial, helpers)?;
        let bounds = HestonParameters::bounds().map_err(CalibrationError::InvalidInput)?;
        let residuals = HelperResiduals {
            helpers,
            weighting: self.weighting,
        };

        let result = self
            .optimizer
            .minimize_until(&residuals, &bounds, &initial.to_array(), criteria, || {
                token.is_cancelled()
            })
            .map_err(|failure| {
                let error = CalibrationError::from(failure);
                warn!(%error, "Heston calibration failed");
                error
            })?;

        let parameters =
            HestonParameters::from_array(&result.x).map_err(CalibrationError::InvalidInput)?;
        let status = ConvergenceStatus::from(result.end_type);
        let feller_satisfied = parameters.feller_satisfied();
        info!(
            %status,
            iterations = result.iterations,
            cost = result.value,
            %parameters,
            "Heston calibration finished"
        );
        if !feller_satisfied {
            warn!(%parameters, "fitted parameters violate the Feller condition");
        }

        Ok(CalibrationOutcome {
            parameters,
            status,
            iterations: result.iterations,
            cost: result.value,
            cost_history: result.cost_history,
            feller_satisfied,
        })
    }

    fn check_inputs(
        &self,
        initial: &HestonParameters,
        helpers: &[CalibrationHelper],
    ) -> Result<(), CalibrationError> {
        if helpers.is_empty() {
            return Err(CalibrationError::InvalidInput(Error::Precondition(
                "no calibration helpers".into(),
            )));
        }
        initial.validate().map_err(CalibrationError::InvalidInput)?;
        if self.weighting == ErrorWeighting::Relative {
            if let Some(h) = helpers.iter().find(|h| h.market_price() <= 0.0) {
                return Err(CalibrationError::InvalidInput(Error::Precondition(format!(
                    "relative weighting needs positive market prices, strike {} has {}",
                    h.option().strike,
                    h.market_price()
                ))));
            }
        }
        Ok(())
    }
}
