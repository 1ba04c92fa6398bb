//! `YieldTermStructure` — discount curves.
//!
//! The pricer consumes only discount factors at year fractions measured
//! from the curve's reference date.

use chrono::NaiveDate;
use heston_core::{DiscountFactor, Time};

/// A yield (interest-rate) term structure.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    /// Date at which discount factors equal one.
    fn reference_date(&self) -> NaiveDate;

    /// Discount factor for a time `t ≥ 0` (year fraction).
    fn discount(&self, t: Time) -> DiscountFactor;
}
