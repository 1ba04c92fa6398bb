//! `CalibrationHelper` — one market quote as a calibration target.
//!
//! The market price is fixed at construction from the quote's implied
//! volatility; the model price is recomputed for every parameter set the
//! optimiser tries.

use heston_core::{
    ensure,
    errors::Result,
    Price, Real, Time, Volatility,
};
use heston_instruments::{Exercise, MarketQuote, OptionSpec};
use heston_models::HestonParameters;
use heston_pricingengines::{black_price, implied_volatility, AnalyticHestonEngine};
use heston_termstructures::MarketContext;
use std::sync::Arc;

/// A quoted European option the model is fitted to.
#[derive(Debug, Clone)]
pub struct CalibrationHelper {
    quote: MarketQuote,
    market: Arc<MarketContext>,
    option: OptionSpec,
    engine: Arc<AnalyticHestonEngine>,
    market_price: Price,
}

impl CalibrationHelper {
    /// Build a helper for `quote`.
    ///
    /// The expiry must fall after the valuation date.
    pub fn new(
        quote: MarketQuote,
        market: Arc<MarketContext>,
        engine: Arc<AnalyticHestonEngine>,
    ) -> Result<Self> {
        let maturity = market.year_fraction(quote.expiry);
        ensure!(
            maturity > 0.0,
            "expiry {} is not after valuation date {}",
            quote.expiry,
            market.valuation_date()
        );
        let option = OptionSpec::new(quote.strike, maturity, quote.option_type, Exercise::European)?;
        let market_price = black_price(
            quote.option_type,
            market.spot(),
            quote.strike,
            market.discount(maturity),
            market.dividend_discount(maturity),
            quote.implied_vol,
            maturity,
        );
        Ok(Self {
            quote,
            market,
            option,
            engine,
            market_price,
        })
    }

    /// One helper per quote, sharing `market` and `engine`.
    pub fn from_quotes(
        quotes: &[MarketQuote],
        market: &Arc<MarketContext>,
        engine: &Arc<AnalyticHestonEngine>,
    ) -> Result<Vec<Self>> {
        quotes
            .iter()
            .map(|q| Self::new(*q, Arc::clone(market), Arc::clone(engine)))
            .collect()
    }

    /// The quote this helper was built from.
    pub fn quote(&self) -> &MarketQuote {
        &self.quote
    }

    /// The option priced by the model.
    pub fn option(&self) -> &OptionSpec {
        &self.option
    }

    /// The shared market snapshot.
    pub fn market(&self) -> &MarketContext {
        &self.market
    }

    /// Year fraction to expiry.
    pub fn maturity(&self) -> Time {
        self.option.maturity
    }

    /// Black–Scholes price of the quote.
    pub fn market_price(&self) -> Price {
        self.market_price
    }

    /// Heston price under `params`.
    pub fn model_price(&self, params: &HestonParameters) -> Result<Price> {
        self.engine.price(params, &self.market, &self.option)
    }

    /// `model_price − market_price`.
    pub fn calibration_error(&self, params: &HestonParameters) -> Result<Real> {
        Ok(self.model_price(params)? - self.market_price)
    }

    /// Black volatility implied by the model price.
    pub fn model_implied_vol(&self, params: &HestonParameters) -> Result<Volatility> {
        let t = self.maturity();
        implied_volatility(
            self.option.option_type,
            self.model_price(params)?,
            self.market.spot(),
            self.option.strike,
            self.market.discount(t),
            self.market.dividend_discount(t),
            t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use heston_core::errors::Error;
    use heston_instruments::OptionType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn market() -> Arc<MarketContext> {
        Arc::new(MarketContext::with_flat_rates(100.0, date(2022, 7, 26), 0.02, 0.0).unwrap())
    }

    #[test]
    fn market_price_is_black_scholes() {
        let quote = MarketQuote::new(date(2023, 7, 26), 100.0, 0.2).unwrap();
        let h = CalibrationHelper::new(quote, market(), Arc::default()).unwrap();
        assert_abs_diff_eq!(h.maturity(), 1.0, epsilon = 1e-15);
        let df = (-0.02_f64).exp();
        let expected = black_price(OptionType::Call, 100.0, 100.0, df, 1.0, 0.2, 1.0);
        assert_eq!(h.market_price(), expected);
        assert_eq!(h.quote(), &quote);
        assert_eq!(h.option().exercise, Exercise::European);
    }

    #[test]
    fn calibration_error_is_model_minus_market() {
        let quote = MarketQuote::new(date(2023, 7, 26), 105.0, 0.2).unwrap();
        let h = CalibrationHelper::new(quote, market(), Arc::default()).unwrap();
        let params = HestonParameters::new(0.04, 1.0, 0.04, 0.3, -0.5);
        let model = h.model_price(&params).unwrap();
        assert_abs_diff_eq!(
            h.calibration_error(&params).unwrap(),
            model - h.market_price(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn flat_variance_model_recovers_quote_vol() {
        let quote = MarketQuote::new(date(2023, 1, 26), 95.0, 0.25).unwrap();
        let h = CalibrationHelper::new(quote, market(), Arc::default()).unwrap();
        let flat = HestonParameters::new(0.0625, 1.0, 0.0625, 0.0, 0.0);
        assert_abs_diff_eq!(h.calibration_error(&flat).unwrap(), 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(h.model_implied_vol(&flat).unwrap(), 0.25, epsilon = 1e-8);
    }

    #[test]
    fn expired_quote_is_rejected() {
        let quote = MarketQuote::new(date(2022, 7, 26), 100.0, 0.2).unwrap();
        let r = CalibrationHelper::new(quote, market(), Arc::default());
        assert!(matches!(r, Err(Error::Precondition(_))));
    }

    #[test]
    fn from_quotes_shares_market() {
        let quotes: Vec<MarketQuote> = [90.0, 100.0, 110.0]
            .into_iter()
            .map(|k| MarketQuote::new(date(2023, 7, 26), k, 0.2).unwrap())
            .collect();
        let m = market();
        let helpers = CalibrationHelper::from_quotes(&quotes, &m, &Arc::default()).unwrap();
        assert_eq!(helpers.len(), 3);
        assert_eq!(Arc::strong_count(&m), 4);
        assert!(helpers[0].market_price() > helpers[2].market_price());
    }
}
