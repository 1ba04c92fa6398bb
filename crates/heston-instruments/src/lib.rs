//! # heston-instruments
//!
//! Vanilla option contracts and the implied-volatility quotes they are
//! calibrated against.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod market_quote;
pub mod option;
pub mod payoff;

pub use exercise::Exercise;
pub use market_quote::MarketQuote;
pub use option::OptionSpec;
pub use payoff::OptionType;
