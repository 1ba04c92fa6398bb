//! `OptionSpec` — the contract terms a pricer needs.

use crate::{exercise::Exercise, payoff::OptionType};
use heston_core::{ensure, errors::Result, Real, Time};

/// A vanilla option on the context's underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionSpec {
    /// Strike price, `> 0`.
    pub strike: Real,
    /// Time to expiry as a year fraction, `≥ 0`.
    pub maturity: Time,
    /// Call or put.
    pub option_type: OptionType,
    /// Exercise style.
    pub exercise: Exercise,
}

impl OptionSpec {
    /// Create a validated option.
    pub fn new(
        strike: Real,
        maturity: Time,
        option_type: OptionType,
        exercise: Exercise,
    ) -> Result<Self> {
        ensure!(
            strike > 0.0 && strike.is_finite(),
            "strike must be positive and finite, got {strike}"
        );
        ensure!(
            maturity >= 0.0 && maturity.is_finite(),
            "maturity must be non-negative and finite, got {maturity}"
        );
        Ok(Self {
            strike,
            maturity,
            option_type,
            exercise,
        })
    }

    /// A European call.
    pub fn european_call(strike: Real, maturity: Time) -> Result<Self> {
        Self::new(strike, maturity, OptionType::Call, Exercise::European)
    }

    /// A European put.
    pub fn european_put(strike: Real, maturity: Time) -> Result<Self> {
        Self::new(strike, maturity, OptionType::Put, Exercise::European)
    }

    /// The same contract with the opposite option type.
    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    /// Value of immediate exercise against `spot`.
    pub fn intrinsic(&self, spot: Real) -> Real {
        self.option_type.payoff(spot, self.strike)
    }
}
