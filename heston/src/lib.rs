//! # heston
//!
//! Semi-analytic pricing of European options under the Heston stochastic
//! volatility model, and Levenberg–Marquardt calibration of its five
//! parameters to implied-volatility quotes.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `heston-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use heston::instruments::OptionSpec;
//! use heston::models::HestonParameters;
//! use heston::pricingengines::AnalyticHestonEngine;
//! use heston::termstructures::MarketContext;
//!
//! let today = chrono::NaiveDate::from_ymd_opt(2022, 7, 26).unwrap();
//! let market = MarketContext::with_flat_rates(100.0, today, 0.02, 0.0).unwrap();
//! let params = HestonParameters::new(0.04, 1.0, 0.04, 0.3, -0.5);
//! let call = OptionSpec::european_call(100.0, 1.0).unwrap();
//!
//! let price = AnalyticHestonEngine::new().price(&params, &market, &call).unwrap();
//! assert!((price - 8.5635287).abs() < 1e-3);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use heston_core as core;

/// Arrays, matrices, distributions, quadrature, root finding, optimisation.
pub use heston_math as math;

/// Day counters, yield curves, and the market snapshot.
pub use heston_termstructures as termstructures;

/// Options and market quotes.
pub use heston_instruments as instruments;

/// Heston model parameters.
pub use heston_models as models;

/// Black and Heston pricing engines.
pub use heston_pricingengines as pricingengines;

/// Calibration helpers, calibrator, and reporting.
pub use heston_calibration as calibration;
