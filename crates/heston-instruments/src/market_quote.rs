//! `MarketQuote` — one observed implied volatility.

use crate::payoff::OptionType;
use chrono::NaiveDate;
use heston_core::{ensure, errors::Result, Real, Volatility};

/// A market-observed implied volatility for one strike and expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketQuote {
    /// Expiry date of the quoted option.
    pub expiry: NaiveDate,
    /// Strike price.
    pub strike: Real,
    /// Black–Scholes implied volatility.
    pub implied_vol: Volatility,
    /// Quoted option type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub option_type: OptionType,
}

impl MarketQuote {
    /// Create a validated call quote.
    pub fn new(expiry: NaiveDate, strike: Real, implied_vol: Volatility) -> Result<Self> {
        ensure!(
            strike > 0.0 && strike.is_finite(),
            "strike must be positive and finite, got {strike}"
        );
        ensure!(
            implied_vol >= 0.0 && implied_vol.is_finite(),
            "implied volatility must be non-negative and finite, got {implied_vol}"
        );
        Ok(Self {
            expiry,
            strike,
            implied_vol,
            option_type: OptionType::Call,
        })
    }

    /// The same quote for a different option type.
    pub fn with_option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }
}
