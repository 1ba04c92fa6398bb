//! # heston-calibration
//!
//! Fits [`HestonParameters`](heston_models::HestonParameters) to a panel of
//! implied-volatility quotes.
//!
//! Each quote becomes a [`CalibrationHelper`] holding its Black–Scholes
//! market price; [`HestonCalibrator`] minimises the squared (optionally
//! relative) pricing errors with projected Levenberg–Marquardt, and
//! [`CalibrationReport`] summarises the fit.
//!
//! With the default `parallel` feature, residuals and Jacobian columns are
//! evaluated on the rayon thread pool.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calibration_helper;
pub mod calibrator;
pub mod cancellation;
pub mod error;
pub mod report;

pub use calibration_helper::CalibrationHelper;
pub use calibrator::{CalibrationOutcome, ConvergenceStatus, ErrorWeighting, HestonCalibrator};
pub use cancellation::CancellationToken;
pub use error::CalibrationError;
pub use report::{CalibrationReport, ReportRow, ReportSummary};
