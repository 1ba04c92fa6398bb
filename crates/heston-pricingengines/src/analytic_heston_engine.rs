//! Semi-analytic Heston pricing engine.
//!
//! Prices European options under the Heston stochastic volatility model:
//!
//! $$dS = (r-q) S \, dt + \sqrt{v} S \, dW_1$$
//! $$dv = \kappa(\theta - v) \, dt + \sigma \sqrt{v} \, dW_2$$
//! $$dW_1 dW_2 = \rho \, dt$$
//!
//! Both exercise probabilities are folded into one Fourier integral,
//!
//! $$C = D_r\left[\frac{F - K}{2} + \frac{1}{\pi}\int_0^\infty
//!   \Re\!\left[\frac{e^{-iuk}\,\big(F\varphi(u - i) - K\varphi(u)\big)}{iu}\right] du\right],
//!   \qquad k = \ln(K/F),$$
//!
//! integrated with adaptive Gauss–Kronrod on doubling panels
//! `[0, U₀], [U₀, 2U₀], …` until the integrand envelope at the upper limit
//! falls below tolerance. Puts follow from parity.

use crate::characteristic_function::characteristic_function;
use heston_core::{
    ensure,
    errors::{Error, Result},
    Price, Real, Size,
};
use heston_instruments::{Exercise, OptionSpec, OptionType};
use heston_math::integrals::{GaussKronrodAdaptive, IntegrationOutcome};
use heston_models::HestonParameters;
use heston_termstructures::MarketContext;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::trace;

// ── Settings ──────────────────────────────────────────────────────────────────

/// Quadrature settings of the [`AnalyticHestonEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IntegrationSettings {
    /// Absolute tolerance of each panel and of the truncation test.
    pub absolute_tolerance: Real,
    /// Relative tolerance of each panel and of the truncation test.
    pub relative_tolerance: Real,
    /// Maximum number of intervals per panel.
    pub max_subdivisions: Size,
    /// Upper end `U₀` of the first panel.
    pub initial_upper_limit: Real,
    /// Truncation point beyond which the integral is declared divergent.
    pub max_upper_limit: Real,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1.0e-12,
            relative_tolerance: 1.0e-10,
            max_subdivisions: 500,
            initial_upper_limit: 16.0,
            max_upper_limit: 1.0e6,
        }
    }
}

impl IntegrationSettings {
    /// Set both tolerances.
    pub fn with_tolerances(mut self, absolute: Real, relative: Real) -> Self {
        self.absolute_tolerance = absolute;
        self.relative_tolerance = relative;
        self
    }

    /// Set the per-panel subdivision cap.
    pub fn with_max_subdivisions(mut self, max_subdivisions: Size) -> Self {
        self.max_subdivisions = max_subdivisions;
        self
    }

    /// Set the first-panel and maximum upper limits.
    pub fn with_upper_limits(mut self, initial: Real, max: Real) -> Self {
        self.initial_upper_limit = initial;
        self.max_upper_limit = max;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.absolute_tolerance >= 0.0 && self.relative_tolerance >= 0.0,
            "integration tolerances must be non-negative, got ({}, {})",
            self.absolute_tolerance,
            self.relative_tolerance
        );
        ensure!(
            self.absolute_tolerance > 0.0 || self.relative_tolerance > 0.0,
            "at least one integration tolerance must be positive"
        );
        ensure!(self.max_subdivisions > 0, "max_subdivisions must be positive");
        ensure!(
            self.initial_upper_limit > 0.0 && self.initial_upper_limit <= self.max_upper_limit,
            "upper limits must satisfy 0 < initial ({}) <= max ({})",
            self.initial_upper_limit,
            self.max_upper_limit
        );
        Ok(())
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// A price with its quadrature diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonPrice {
    /// Option value, clamped at zero.
    pub value: Price,
    /// Quadrature error estimate in price units.
    pub error_estimate: Real,
    /// Integrand evaluations spent.
    pub evaluations: Size,
    /// Truncation point of the integral, zero when no integration ran.
    pub upper_limit: Real,
}

impl HestonPrice {
    fn closed_form(value: Price) -> Self {
        Self {
            value,
            error_estimate: 0.0,
            evaluations: 0,
            upper_limit: 0.0,
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Semi-analytic Heston engine.
///
/// Stateless apart from its settings; one instance is shared by every
/// calibration helper and may be used from many threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyticHestonEngine {
    settings: IntegrationSettings,
}

impl AnalyticHestonEngine {
    /// An engine with default [`IntegrationSettings`].
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with the given settings.
    pub fn with_settings(settings: IntegrationSettings) -> Self {
        Self { settings }
    }

    /// The quadrature settings.
    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    /// Price `option` under `params` in `market`.
    pub fn price(
        &self,
        params: &HestonParameters,
        market: &MarketContext,
        option: &OptionSpec,
    ) -> Result<Price> {
        self.price_detailed(params, market, option).map(|p| p.value)
    }

    /// Price with quadrature diagnostics.
    ///
    /// Fails with [`Error::InvalidParameter`] for parameters outside the
    /// Heston domain and with [`Error::Integration`] when a panel exhausts
    /// its subdivisions or the integral does not decay before
    /// `max_upper_limit`; the latter carries the best price estimate.
    pub fn price_detailed(
        &self,
        params: &HestonParameters,
        market: &MarketContext,
        option: &OptionSpec,
    ) -> Result<HestonPrice> {
        match option.exercise {
            Exercise::European => self.price_european(params, market, option),
        }
    }

    fn price_european(
        &self,
        params: &HestonParameters,
        market: &MarketContext,
        option: &OptionSpec,
    ) -> Result<HestonPrice> {
        let t = option.maturity;
        if t <= 0.0 {
            return Ok(HestonPrice::closed_form(option.intrinsic(market.spot())));
        }
        params.validate()?;
        self.settings.validate()?;

        let spot = market.spot();
        let strike = option.strike;
        let dr = market.discount(t);
        let dq = market.dividend_discount(t);
        let forward = spot * dq / dr;

        if params.v0 == 0.0 && params.kappa * params.theta == 0.0 {
            return Ok(HestonPrice::closed_form(
                dr * option.option_type.payoff(forward, strike),
            ));
        }

        let to_price = |integral: Real| {
            let call = dr * (0.5 * (forward - strike) + integral / PI);
            let value = match option.option_type {
                OptionType::Call => call,
                OptionType::Put => call - spot * dq + strike * dr,
            };
            value.max(0.0)
        };

        let k = (strike / forward).ln();
        let phi = |u: Complex64| characteristic_function(u, params, t);
        let integrand = |u: Real| {
            let rotation = Complex64::new(0.0, -u * k).exp();
            let numerator =
                forward * phi(Complex64::new(u, -1.0)) - strike * phi(Complex64::new(u, 0.0));
            (rotation * numerator / Complex64::new(0.0, u)).re
        };
        let envelope = |u: Real| {
            (forward * phi(Complex64::new(u, -1.0)).norm() + strike * phi(Complex64::new(u, 0.0)).norm())
                / u
        };

        let s = &self.settings;
        let integrator =
            GaussKronrodAdaptive::new(s.absolute_tolerance, s.relative_tolerance, s.max_subdivisions);
        let mut total = IntegrationOutcome::ZERO;
        let (mut lower, mut upper) = (0.0, s.initial_upper_limit);
        loop {
            let panel = integrator
                .integrate_with_estimate(&integrand, lower, upper)
                .map_err(|e| match e {
                    Error::Integration {
                        estimate,
                        error_bound,
                        tolerance,
                        evaluations,
                    } => Error::Integration {
                        estimate: to_price(total.value + estimate),
                        error_bound: dr * (total.error_estimate + error_bound) / PI,
                        tolerance: dr * tolerance / PI,
                        evaluations: total.evaluations + evaluations,
                    },
                    other => other,
                })?;
            total = total.merge(panel);

            let tail = envelope(upper);
            let tolerance = integrator.tolerance(total.value);
            if tail <= tolerance {
                break;
            }
            lower = upper;
            upper *= 2.0;
            if upper > s.max_upper_limit {
                return Err(Error::Integration {
                    estimate: to_price(total.value),
                    error_bound: dr * (total.error_estimate + tail) / PI,
                    tolerance: dr * tolerance / PI,
                    evaluations: total.evaluations,
                });
            }
            trace!(lower, upper, tail, "extending Heston integration range");
        }

        Ok(HestonPrice {
            value: to_price(total.value),
            error_estimate: dr * total.error_estimate / PI,
            evaluations: total.evaluations,
            upper_limit: upper,
        })
    }
}
