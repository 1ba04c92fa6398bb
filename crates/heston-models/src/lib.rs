//! # heston-models
//!
//! The Heston stochastic-volatility model's parameter set.
//!
//! ```text
//! dS = (r − q)·S dt + √v·S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁·dW₂ = ρ dt
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod heston_parameters;

pub use heston_parameters::HestonParameters;
