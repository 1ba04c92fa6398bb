//! Day-count conventions.
//!
//! Only the convention the calibration workflow needs is provided; the
//! trait is the extension point for others.

use chrono::NaiveDate;
use heston_core::Time;

/// A day-count convention mapping a pair of dates to a year fraction.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: NaiveDate, d2: NaiveDate) -> i64;

    /// Fraction of a year between `d1` and `d2`; negative when `d2 < d1`.
    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time;
}

/// Actual/365 (Fixed): actual calendar days over a 365-day year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn day_count(&self, d1: NaiveDate, d2: NaiveDate) -> i64 {
        (d2 - d1).num_days()
    }

    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time {
        self.day_count(d1, d2) as Time / 365.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_day_option() {
        let dc = Actual365Fixed;
        assert_eq!(dc.day_count(date(2022, 7, 26), date(2022, 7, 27)), 1);
        assert_abs_diff_eq!(
            dc.year_fraction(date(2022, 7, 26), date(2022, 7, 27)),
            1.0 / 365.0,
            epsilon = 1e-16
        );
    }

    #[test]
    fn leap_year_is_not_special() {
        let dc = Actual365Fixed;
        assert_eq!(dc.day_count(date(2024, 1, 1), date(2025, 1, 1)), 366);
        assert_abs_diff_eq!(
            dc.year_fraction(date(2024, 1, 1), date(2025, 1, 1)),
            366.0 / 365.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn reversed_dates_are_negative() {
        let dc = Actual365Fixed;
        assert!(dc.year_fraction(date(2022, 7, 27), date(2022, 7, 26)) < 0.0);
        assert_eq!(dc.name(), "Actual/365 (Fixed)");
    }
}
