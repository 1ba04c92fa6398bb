//! `FlatForward` — a yield term structure with a constant forward rate.

use crate::yield_term_structure::YieldTermStructure;
use chrono::NaiveDate;
use heston_core::{DiscountFactor, Rate, Time};

/// A flat (constant) continuously-compounded yield curve.
///
/// Discount factors are `P(t) = exp(-r·t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatForward {
    reference_date: NaiveDate,
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve from a continuously-compounded rate.
    pub fn continuous(reference_date: NaiveDate, rate: Rate) -> Self {
        Self {
            reference_date,
            rate,
        }
    }
}

impl YieldTermStructure for FlatForward {
    fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }
}
