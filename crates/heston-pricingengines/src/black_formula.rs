//! Black formula and its implied-volatility inverse.
//!
//! Market quotes arrive as implied volatilities; the calibration compares
//! prices, so every quote passes through [`black_price`] once, and model
//! prices can be mapped back with [`implied_volatility`].
//!
//! $$C = D_r\,[F\,N(d_1) - K\,N(d_2)], \qquad
//!   d_{1,2} = \frac{\ln(F/K)}{\sigma\sqrt{T}} \pm \tfrac12\sigma\sqrt{T}$$

use heston_core::{
    ensure,
    errors::{Error, Result},
    DiscountFactor, Price, Real, Time, Volatility,
};
use heston_instruments::OptionType;
use heston_math::{normal_cdf, solvers1d::brent};

const IMPLIED_VOL_ACCURACY: Real = 1.0e-12;
const MAX_IMPLIED_VOL: Volatility = 64.0;

/// Undiscounted-forward Black formula.
///
/// `std_dev` is the total standard deviation `σ·√T`; at zero it returns the
/// discounted forward intrinsic value.
pub fn black_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: DiscountFactor,
) -> Price {
    let phi = option_type.sign();
    if std_dev <= 0.0 {
        return discount * option_type.payoff(forward, strike);
    }
    if strike == 0.0 {
        return if option_type == OptionType::Call {
            discount * forward
        } else {
            0.0
        };
    }
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    let value = discount * phi * (forward * normal_cdf(phi * d1) - strike * normal_cdf(phi * d2));
    value.max(0.0)
}

/// Black–Scholes price from spot, discount factors, and volatility.
pub fn black_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    discount: DiscountFactor,
    dividend_discount: DiscountFactor,
    volatility: Volatility,
    maturity: Time,
) -> Price {
    let forward = spot * dividend_discount / discount;
    black_formula(
        option_type,
        strike,
        forward,
        volatility * maturity.max(0.0).sqrt(),
        discount,
    )
}

/// Volatility reproducing `price` under the Black formula, by Brent's
/// method.
///
/// The price must lie between the discounted forward intrinsic value and
/// the no-arbitrage upper bound (`S·Dq` for calls, `K·Dr` for puts). A
/// price equal to the lower bound yields zero volatility.
pub fn implied_volatility(
    option_type: OptionType,
    price: Price,
    spot: Real,
    strike: Real,
    discount: DiscountFactor,
    dividend_discount: DiscountFactor,
    maturity: Time,
) -> Result<Volatility> {
    ensure!(maturity > 0.0, "implied volatility needs a positive maturity, got {maturity}");
    ensure!(price.is_finite(), "price must be finite, got {price}");
    let forward = spot * dividend_discount / discount;
    let lower = discount * option_type.payoff(forward, strike);
    let upper = match option_type {
        OptionType::Call => spot * dividend_discount,
        OptionType::Put => strike * discount,
    };
    ensure!(
        price >= lower - IMPLIED_VOL_ACCURACY && price < upper,
        "{option_type} price {price} outside no-arbitrage bounds [{lower}, {upper})"
    );
    if price <= lower {
        return Ok(0.0);
    }

    let objective = |vol: Volatility| {
        black_price(option_type, spot, strike, discount, dividend_discount, vol, maturity) - price
    };
    let mut high = 1.0;
    while objective(high) < 0.0 {
        high *= 2.0;
        if high > MAX_IMPLIED_VOL {
            return Err(Error::Runtime(format!(
                "implied volatility above {MAX_IMPLIED_VOL} for {option_type} price {price}"
            )));
        }
    }
    brent(objective, 0.0, high, IMPLIED_VOL_ACCURACY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn discounts(r: Real, q: Real, t: Time) -> (DiscountFactor, DiscountFactor) {
        ((-r * t).exp(), (-q * t).exp())
    }

    #[test]
    fn textbook_call() {
        let (dr, dq) = discounts(0.05, 0.0, 1.0);
        let c = black_price(OptionType::Call, 100.0, 100.0, dr, dq, 0.2, 1.0);
        assert_abs_diff_eq!(c, 10.450_583_572_185_565, epsilon = 1e-10);
    }

    #[test]
    fn put_call_parity() {
        let (dr, dq) = discounts(0.03, 0.01, 0.75);
        let c = black_price(OptionType::Call, 100.0, 110.0, dr, dq, 0.25, 0.75);
        let p = black_price(OptionType::Put, 100.0, 110.0, dr, dq, 0.25, 0.75);
        assert_abs_diff_eq!(c - p, 100.0 * dq - 110.0 * dr, epsilon = 1e-12);
    }

    #[test]
    fn zero_volatility_is_discounted_forward_intrinsic() {
        let (dr, dq) = discounts(0.02, 0.0, 1.0);
        let fwd = 100.0 * dq / dr;
        let c = black_price(OptionType::Call, 100.0, 95.0, dr, dq, 0.0, 1.0);
        assert_abs_diff_eq!(c, dr * (fwd - 95.0), epsilon = 1e-12);
        assert_eq!(black_price(OptionType::Put, 100.0, 95.0, dr, dq, 0.0, 1.0), 0.0);
    }

    #[test]
    fn implied_volatility_round_trip() {
        let (dr, dq) = discounts(0.02256, 0.0, 1.0 / 365.0);
        for (k, vol, ty) in [
            (2.80, 0.35, OptionType::Call),
            (2.878, 0.21, OptionType::Call),
            (3.00, 0.18, OptionType::Call),
            (2.75, 0.30, OptionType::Put),
        ] {
            let p = black_price(ty, 2.878, k, dr, dq, vol, 1.0 / 365.0);
            let iv = implied_volatility(ty, p, 2.878, k, dr, dq, 1.0 / 365.0).unwrap();
            assert_abs_diff_eq!(iv, vol, epsilon = 1e-8);
        }
    }

    #[test]
    fn implied_volatility_of_high_vol_price() {
        let (dr, dq) = discounts(0.01, 0.0, 2.0);
        let p = black_price(OptionType::Call, 100.0, 100.0, dr, dq, 3.0, 2.0);
        let iv = implied_volatility(OptionType::Call, p, 100.0, 100.0, dr, dq, 2.0).unwrap();
        assert_abs_diff_eq!(iv, 3.0, epsilon = 1e-8);
    }

    #[test]
    fn implied_volatility_rejects_arbitrage() {
        let (dr, dq) = discounts(0.02, 0.0, 1.0);
        let r = implied_volatility(OptionType::Call, 101.0, 100.0, 100.0, dr, dq, 1.0);
        assert!(matches!(r, Err(Error::Precondition(_))));
        let r = implied_volatility(OptionType::Call, 0.5, 100.0, 90.0, dr, dq, 1.0);
        assert!(matches!(r, Err(Error::Precondition(_))));
        let r = implied_volatility(OptionType::Call, 5.0, 100.0, 100.0, dr, dq, 0.0);
        assert!(r.is_err());
    }

    #[test]
    fn intrinsic_price_has_zero_vol() {
        let (dr, dq) = discounts(0.0, 0.0, 1.0);
        let iv = implied_volatility(OptionType::Call, 10.0, 100.0, 90.0, dr, dq, 1.0).unwrap();
        assert_eq!(iv, 0.0);
    }
}
