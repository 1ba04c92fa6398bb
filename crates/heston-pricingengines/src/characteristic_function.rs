//! Heston characteristic function in the "little trap" form.
//!
//! $$\varphi(u) = \mathbb{E}\left[e^{iu\ln(S_T/F)}\right] = e^{C(u) + D(u)\,v_0}$$
//!
//! With $\xi = \kappa - \sigma\rho iu$, $a = u^2 + iu$ and
//! $d = \sqrt{\xi^2 + \sigma^2 a}$ on the branch $\Re d \ge 0$, the
//! coefficients are written through $-a/(\xi + d)$ instead of
//! $(\xi - d)/\sigma^2$, so nothing divides by $\sigma^2$ and the
//! $\sigma \to 0$ limit is the deterministic-variance one. The logarithm
//! $\ln\frac{1 - g e^{-dT}}{1 - g}$ is taken as $\ln(1 + w)$ with
//! $w = g(1 - e^{-dT})/(1 - g)$ on the principal branch, which keeps
//! $\varphi$ continuous along the integration path.
//!
//! When $\kappa$ and $\sigma$ are both small, $d$ is small while
//! $-a/(\xi + d)$ is large, so $1 - e^{-dT}$ and $\ln(1 + w)$ go through
//! cancellation-free `expm1`/`log1p` forms.

use heston_core::{Real, Time};
use heston_models::HestonParameters;
use num_complex::Complex64;
use num_traits::One;

const SERIES_THRESHOLD: Real = 1.0e-6;

/// Evaluate `φ(u) = E[exp(i·u·ln(S_T/F))]` at complex `u` for maturity `t`.
///
/// `φ(0) = φ(−i) = 1`. The engine evaluates it at real `u` and at `u − i`.
pub fn characteristic_function(u: Complex64, params: &HestonParameters, t: Time) -> Complex64 {
    let HestonParameters {
        v0,
        kappa,
        theta,
        sigma,
        rho,
    } = *params;
    let iu = Complex64::i() * u;
    let a = u * u + iu;
    let xi = kappa - sigma * rho * iu;
    let mut d = (xi * xi + sigma * sigma * a).sqrt();
    if d.re < 0.0 {
        d = -d;
    }

    let s = xi + d;
    if s.norm() <= Real::EPSILON * (kappa + sigma.abs() * (1.0 + u.norm())) {
        // ξ + d vanishes only where σ²a = 0: variance frozen at v0
        return (-0.5 * a * v0 * t).exp();
    }

    let x_minus_d = -a / s;
    let h = x_minus_d / s;
    let g = sigma * sigma * h;
    let one = Complex64::one();
    let one_minus_e = -exp_m1(-d * t);
    let e = one - one_minus_e;
    let one_minus_g = one - g;

    let w = g * one_minus_e / one_minus_g;
    let big_d = x_minus_d * one_minus_e / (one - g * e);
    let log_term = 2.0 * h * one_minus_e / one_minus_g * log1p_ratio(w);
    let big_c = kappa * theta * (x_minus_d * t - log_term);

    (big_c + big_d * v0).exp()
}

/// `ln(1 + w)/w`, continued by its series near `w = 0`.
pub(crate) fn log1p_ratio(w: Complex64) -> Complex64 {
    if w.norm() < SERIES_THRESHOLD {
        Complex64::one() - w / 2.0 + w * w / 3.0
    } else {
        ln_1p(w) / w
    }
}

/// Principal `ln(1 + w)` without forming `1 + w`.
fn ln_1p(w: Complex64) -> Complex64 {
    Complex64::new(
        0.5 * (2.0 * w.re + w.norm_sqr()).ln_1p(),
        w.im.atan2(1.0 + w.re),
    )
}

/// `exp(z) − 1` without cancellation for small `|z|`.
fn exp_m1(z: Complex64) -> Complex64 {
    let half_sin = (0.5 * z.im).sin();
    Complex64::new(
        z.re.exp_m1() * z.im.cos() - 2.0 * half_sin * half_sin,
        z.re.exp() * z.im.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn benchmark() -> HestonParameters {
        HestonParameters::new(0.04, 1.0, 0.04, 0.3, -0.5)
    }

    #[test]
    fn normalisation() {
        let p = benchmark();
        for t in [0.1, 1.0, 10.0] {
            let at_zero = characteristic_function(Complex64::new(0.0, 0.0), &p, t);
            assert_abs_diff_eq!(at_zero.re, 1.0, epsilon = 1e-14);
            assert_abs_diff_eq!(at_zero.im, 0.0, epsilon = 1e-14);
            // martingale condition: E[S_T/F] = 1
            let at_minus_i = characteristic_function(Complex64::new(0.0, -1.0), &p, t);
            assert_abs_diff_eq!(at_minus_i.re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(at_minus_i.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn modulus_bounded_by_one_on_real_axis() {
        let p = benchmark();
        for k in 0..400 {
            let u = 0.25 * k as Real;
            let phi = characteristic_function(Complex64::new(u, 0.0), &p, 1.0);
            assert!(phi.norm() <= 1.0 + 1e-12, "u = {u}: |φ| = {}", phi.norm());
        }
    }

    #[test]
    fn zero_vol_of_vol_is_gaussian() {
        let (v0, kappa, theta, t) = (0.09, 1.5, 0.04, 2.0);
        let p = HestonParameters::new(v0, kappa, theta, 0.0, -0.7);
        let var = theta * t + (v0 - theta) * (1.0 - (-kappa * t).exp()) / kappa;
        for u in [0.3, 1.0, 4.0, 11.0] {
            let z = Complex64::new(u, 0.0);
            let expected = (-0.5 * (z * z + Complex64::i() * z) * var).exp();
            let phi = characteristic_function(z, &p, t);
            assert_abs_diff_eq!(phi.re, expected.re, epsilon = 1e-13);
            assert_abs_diff_eq!(phi.im, expected.im, epsilon = 1e-13);
        }
    }

    #[test]
    fn degenerate_point_uses_frozen_variance() {
        let p = HestonParameters::new(0.04, 0.0, 0.0, 0.0, 0.0);
        let z = Complex64::new(0.0, 0.0);
        assert_abs_diff_eq!(characteristic_function(z, &p, 1.0).re, 1.0, epsilon = 1e-15);
        let z = Complex64::new(2.0, 0.0);
        let expected = (-0.5 * (z * z + Complex64::i() * z) * 0.04).exp();
        let phi = characteristic_function(z, &p, 1.0);
        assert_abs_diff_eq!(phi.re, expected.re, epsilon = 1e-15);
        assert_abs_diff_eq!(phi.im, expected.im, epsilon = 1e-15);
    }

    #[test]
    fn continuous_across_the_branch_cut_regime() {
        // long maturity with high vol-of-vol: the naive Heston logarithm jumps here
        let p = HestonParameters::new(0.04, 0.5, 0.06, 1.5, -0.9);
        let t = 10.0;
        let step = 1.0e-3;
        for shift in [0.0, -1.0] {
            let at = |u: Real| characteristic_function(Complex64::new(u, shift), &p, t);
            let mut prev = at(0.0);
            let mut max_jump: Real = 0.0;
            let mut u = step;
            while u <= 200.0 {
                let cur = at(u);
                max_jump = max_jump.max((cur - prev).norm());
                prev = cur;
                u += step;
            }
            assert!(max_jump < 1.0e-3, "shift {shift}: max jump {max_jump}");
        }
    }

    #[test]
    fn log1p_ratio_on_both_sides_of_threshold() {
        // reference values to 40 digits
        let below = log1p_ratio(Complex64::new(0.9e-6, 0.3e-6));
        assert_abs_diff_eq!(below.re, 0.999_999_550_000_240_0, epsilon = 1e-15);
        assert_abs_diff_eq!(below.im, -1.499_998_200_001_755e-7, epsilon = 1e-15);
        let above = log1p_ratio(Complex64::new(1.2e-6, -0.5e-6));
        assert_abs_diff_eq!(above.re, 0.999_999_400_000_396_7, epsilon = 1e-15);
        assert_abs_diff_eq!(above.im, 2.499_996_000_005_087e-7, epsilon = 1e-15);
        let big = Complex64::new(2.0, -1.0);
        let expected = (Complex64::one() + big).ln() / big;
        assert_abs_diff_eq!(log1p_ratio(big).re, expected.re, epsilon = 1e-15);
        assert_abs_diff_eq!(log1p_ratio(big).im, expected.im, epsilon = 1e-15);
    }

    #[test]
    fn exp_m1_keeps_small_arguments() {
        let z = Complex64::new(-1.0e-9, 3.0e-10);
        let v = exp_m1(z);
        // exp(z) − 1 = z + z²/2 + O(z³)
        let series = z + z * z / 2.0;
        assert_abs_diff_eq!(v.re, series.re, epsilon = 1e-24);
        assert_abs_diff_eq!(v.im, series.im, epsilon = 1e-24);
        let z = Complex64::new(0.7, -2.0);
        let expected = z.exp() - 1.0;
        assert_abs_diff_eq!(exp_m1(z).re, expected.re, epsilon = 1e-15);
        assert_abs_diff_eq!(exp_m1(z).im, expected.im, epsilon = 1e-15);
    }

    #[test]
    fn no_mean_reversion_and_tiny_vol_of_vol_is_gaussian() {
        let (v0, t) = (0.04, 1.0);
        for sigma in [1e-12, 1e-9] {
            let p = HestonParameters::new(v0, 0.0, 0.04, sigma, 0.0);
            for u in [0.05, 1.0, 7.5, 40.0] {
                for shift in [0.0, -1.0] {
                    let z = Complex64::new(u, shift);
                    let expected = (-0.5 * (z * z + Complex64::i() * z) * v0 * t).exp();
                    let phi = characteristic_function(z, &p, t);
                    assert_abs_diff_eq!(phi.re, expected.re, epsilon = 1e-12);
                    assert_abs_diff_eq!(phi.im, expected.im, epsilon = 1e-12);
                }
            }
        }
    }
}
