//! # heston-pricingengines
//!
//! Pricing engines for European vanilla options: the Black formula with its
//! implied-volatility inverse, and the semi-analytic Heston engine built on
//! a branch-stable characteristic function.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_heston_engine;
pub mod black_formula;
pub mod characteristic_function;

pub use analytic_heston_engine::{AnalyticHestonEngine, HestonPrice, IntegrationSettings};
pub use black_formula::{black_formula, black_price, implied_volatility};
pub use characteristic_function::characteristic_function;
