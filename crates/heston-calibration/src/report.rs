//! `CalibrationReport` — how well a parameter set reprices the quotes.
//!
//! The headline number is the average absolute relative pricing error in
//! percent, `100·mean|model/market − 1|`.

use crate::calibration_helper::CalibrationHelper;
use chrono::NaiveDate;
use heston_core::{ensure, errors::Result, Price, Real};
use heston_models::HestonParameters;
use std::fmt;

const RULE_WIDTH: usize = 100;

/// Market against model for one helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow {
    /// Strike of the quote.
    pub strike: Real,
    /// Expiry of the quote.
    pub expiry: NaiveDate,
    /// Black–Scholes price of the quote.
    pub market_value: Price,
    /// Heston price.
    pub model_value: Price,
    /// Signed `100·(model/market − 1)`.
    pub relative_error_percent: Real,
}

/// The aggregate error and, for detailed reports, one row per helper.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// `100·mean|model/market − 1|`.
    pub average_abs_error_percent: Real,
    /// Per-helper rows; empty unless the report was detailed.
    pub rows: Vec<ReportRow>,
}

impl ReportSummary {
    /// Render as a fixed-column text table.
    ///
    /// Non-detailed summaries render only the average line.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        if !self.rows.is_empty() {
            out.push_str(&format!(
                "{:>15} {:>25} {:>15} {:>15} {:>20}\n",
                "Strikes", "Expiry", "Market Value", "Model Value", "Relative Error (%)"
            ));
            out.push_str(&"=".repeat(RULE_WIDTH));
            out.push('\n');
            for row in &self.rows {
                out.push_str(&format!(
                    "{:>15.2} {:>25} {:>15.5} {:>15.5} {:>20.7}\n",
                    row.strike,
                    row.expiry.to_string(),
                    row.market_value,
                    row.model_value,
                    row.relative_error_percent
                ));
            }
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');
        }
        out.push_str(&format!(
            "Average Abs Error (%) : {:5.9}",
            self.average_abs_error_percent
        ));
        out
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_table())
    }
}

/// Builders for calibration quality summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationReport;

impl CalibrationReport {
    /// Reprice every helper under `params` and summarise the errors.
    pub fn summarize(
        helpers: &[CalibrationHelper],
        params: &HestonParameters,
        detailed: bool,
    ) -> Result<ReportSummary> {
        let market: Vec<Price> = helpers.iter().map(CalibrationHelper::market_price).collect();
        let model = helpers
            .iter()
            .map(|h| h.model_price(params))
            .collect::<Result<Vec<_>>>()?;
        let average_abs_error_percent = Self::summarize_prices(&market, &model)?;

        let rows = if detailed {
            helpers
                .iter()
                .zip(market.iter().zip(&model))
                .map(|(h, (&market_value, &model_value))| ReportRow {
                    strike: h.option().strike,
                    expiry: h.quote().expiry,
                    market_value,
                    model_value,
                    relative_error_percent: 100.0 * (model_value / market_value - 1.0),
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(ReportSummary {
            average_abs_error_percent,
            rows,
        })
    }

    /// `100·mean|model/market − 1|` over matching price pairs.
    pub fn summarize_prices(market: &[Price], model: &[Price]) -> Result<Real> {
        ensure!(!market.is_empty(), "no prices to summarise");
        ensure!(
            market.len() == model.len(),
            "{} market prices but {} model prices",
            market.len(),
            model.len()
        );
        ensure!(
            market.iter().all(|&m| m != 0.0),
            "relative errors need non-zero market prices"
        );
        let total: Real = market
            .iter()
            .zip(model)
            .map(|(&m, &v)| (v / m - 1.0).abs())
            .sum();
        Ok(100.0 * total / market.len() as Real)
    }

    /// One line of a method-comparison summary:
    /// `label | average error | theta kappa sigma rho v0`.
    pub fn comparison_row(label: &str, average_error: Real, params: &HestonParameters) -> String {
        format!(
            "{label:<15} | {average_error:>14.9} | {:>10.6} {:>10.6} {:>10.6} {:>10.6} {:>10.6}",
            params.theta, params.kappa, params.sigma, params.rho, params.v0
        )
    }
}
