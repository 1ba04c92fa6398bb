//! 1D root-finding solvers.
//!
//! Brent's method is used to invert the Black formula for implied
//! volatilities, both when building market prices and when reporting
//! model-implied volatilities.

use heston_core::{
    errors::{Error, Result},
    Real,
};

const MAX_ITERATIONS: u32 = 100;

/// Accuracy used when the caller passes a non-positive one.
pub const DEFAULT_ACCURACY: Real = 1.0e-11;

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation. The
/// bracket must straddle a sign change.
pub fn brent<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a);
    let mut fb = f(b);

    if !(fa.is_finite() && fb.is_finite()) {
        return Err(Error::InvalidArgument(format!(
            "Brent: non-finite function value at bracket ends ({fa}, {fb})"
        )));
    }
    if fa * fb > 0.0 {
        return Err(Error::Precondition(format!(
            "Brent: f({a}) = {fa} and f({b}) = {fb} must have opposite signs"
        )));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * Real::EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                let p = s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0));
                (p, (q - 1.0) * (r - 1.0) * (s - 1.0))
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if xm > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
    }
    Err(Error::Runtime(format!(
        "Brent solver: maximum iterations ({MAX_ITERATIONS}) reached"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn brent_sqrt2() {
        let root = brent(|x| x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-11);
    }

    #[test]
    fn brent_transcendental() {
        let root = brent(|x: Real| x.cos() - x, 0.0, 1.0, 0.0).unwrap();
        assert_abs_diff_eq!(root, 0.739_085_133_215_160_6, epsilon = 1e-10);
    }

    #[test]
    fn brent_endpoint_root() {
        assert_eq!(brent(|x| x - 1.0, 1.0, 3.0, 1e-12).unwrap(), 1.0);
    }

    #[test]
    fn brent_requires_sign_change() {
        let r = brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12);
        assert!(matches!(r, Err(Error::Precondition(_))));
    }

    #[test]
    fn brent_rejects_nan_bracket() {
        let r = brent(|x: Real| x.ln(), -1.0, 2.0, 1e-12);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }
}
