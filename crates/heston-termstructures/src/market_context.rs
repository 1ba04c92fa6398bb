//! `MarketContext` — the immutable market snapshot a pricing run reads.
//!
//! There is no process-wide evaluation date: the valuation date travels
//! with the context, and every year fraction is measured from it.

use crate::day_counter::{Actual365Fixed, DayCounter};
use crate::flat_forward::FlatForward;
use crate::yield_term_structure::YieldTermStructure;
use chrono::NaiveDate;
use heston_core::{ensure, errors::Result, DiscountFactor, Price, Rate, Real, Time};
use std::sync::Arc;

/// Spot, valuation date, and the discount and dividend curves.
///
/// Shared across helpers as `Arc<MarketContext>`; never mutated.
#[derive(Debug, Clone)]
pub struct MarketContext {
    spot: Price,
    valuation_date: NaiveDate,
    discount_curve: Arc<dyn YieldTermStructure>,
    dividend_curve: Arc<dyn YieldTermStructure>,
    day_counter: Arc<dyn DayCounter>,
}

impl MarketContext {
    /// Assemble a market snapshot.
    ///
    /// Both curves must be anchored at `valuation_date`.
    pub fn new(
        spot: Price,
        valuation_date: NaiveDate,
        discount_curve: Arc<dyn YieldTermStructure>,
        dividend_curve: Arc<dyn YieldTermStructure>,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(
            spot > 0.0 && spot.is_finite(),
            "spot must be positive and finite, got {spot}"
        );
        for (name, curve) in [("discount", &discount_curve), ("dividend", &dividend_curve)] {
            ensure!(
                curve.reference_date() == valuation_date,
                "{name} curve reference date {} differs from valuation date {valuation_date}",
                curve.reference_date()
            );
        }
        Ok(Self {
            spot,
            valuation_date,
            discount_curve,
            dividend_curve,
            day_counter,
        })
    }

    /// A snapshot with flat continuously-compounded risk-free and dividend
    /// rates under Actual/365 (Fixed).
    pub fn with_flat_rates(
        spot: Price,
        valuation_date: NaiveDate,
        risk_free_rate: Rate,
        dividend_rate: Rate,
    ) -> Result<Self> {
        Self::new(
            spot,
            valuation_date,
            Arc::new(FlatForward::continuous(valuation_date, risk_free_rate)),
            Arc::new(FlatForward::continuous(valuation_date, dividend_rate)),
            Arc::new(Actual365Fixed),
        )
    }

    /// Underlying spot price.
    pub fn spot(&self) -> Price {
        self.spot
    }

    /// Date all year fractions are measured from.
    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    /// The context's day-count convention.
    pub fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    /// Risk-free discount factor `Dr(t)`.
    pub fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_curve.discount(t)
    }

    /// Dividend discount factor `Dq(t)`.
    pub fn dividend_discount(&self, t: Time) -> DiscountFactor {
        self.dividend_curve.discount(t)
    }

    /// Year fraction from the valuation date to `date`.
    pub fn year_fraction(&self, date: NaiveDate) -> Time {
        self.day_counter.year_fraction(self.valuation_date, date)
    }

    /// Forward price `S·Dq(t)/Dr(t)`.
    pub fn forward(&self, t: Time) -> Real {
        self.spot * self.dividend_discount(t) / self.discount(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use heston_core::errors::Error;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, 26).unwrap()
    }

    #[test]
    fn flat_context_quantities() {
        let m = MarketContext::with_flat_rates(100.0, today(), 0.02, 0.01).unwrap();
        assert_eq!(m.spot(), 100.0);
        assert_eq!(m.valuation_date(), today());
        assert_abs_diff_eq!(m.discount(2.0), (-0.04_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(m.dividend_discount(2.0), (-0.02_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(m.forward(1.0), 100.0 * 0.01_f64.exp(), epsilon = 1e-12);
        let expiry = NaiveDate::from_ymd_opt(2022, 7, 27).unwrap();
        assert_abs_diff_eq!(m.year_fraction(expiry), 1.0 / 365.0, epsilon = 1e-16);
    }

    #[test]
    fn rejects_bad_spot() {
        for spot in [0.0, -1.0, Real::NAN, Real::INFINITY] {
            let r = MarketContext::with_flat_rates(spot, today(), 0.02, 0.0);
            assert!(matches!(r, Err(Error::Precondition(_))), "spot {spot}");
        }
    }

    #[test]
    fn rejects_curve_anchored_elsewhere() {
        let other = NaiveDate::from_ymd_opt(2022, 7, 25).unwrap();
        let r = MarketContext::new(
            100.0,
            today(),
            Arc::new(FlatForward::continuous(other, 0.02)),
            Arc::new(FlatForward::continuous(today(), 0.0)),
            Arc::new(Actual365Fixed),
        );
        match r {
            Err(Error::Precondition(msg)) => assert!(msg.contains("discount curve"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
