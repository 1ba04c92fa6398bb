//! Globally adaptive 15-point Gauss–Kronrod quadrature.
//!
//! Each interval is integrated with the 15-point Kronrod rule and its
//! embedded 7-point Gauss rule; `|K15 − G7|` is the interval's error
//! estimate. The interval with the largest estimate is bisected until the
//! summed estimate meets `max(absolute, relative·|I|)`.

use super::IntegrationOutcome;
use heston_core::{
    errors::{Error, Result},
    Real,
};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Abscissae of the 15-point Kronrod rule on [-1, 1] (positive half, the
// odd-indexed ones are the 7-point Gauss nodes).
const XGK: [Real; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [Real; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

// Weights of the 7-point Gauss rule at XGK[1], XGK[3], XGK[5], XGK[7].
const WG: [Real; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

const POINTS_PER_RULE: usize = 15;

/// One interval of the adaptive partition, ordered by its error estimate.
#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Real,
    b: Real,
    value: Real,
    error: Real,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

fn kronrod_15<F: Fn(Real) -> Real>(f: &F, a: Real, b: Real) -> Segment {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(center);
    let mut kronrod = fc * WGK[7];
    let mut gauss = fc * WG[3];
    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = f(center - dx) + f(center + dx);
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }
    Segment {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    }
}

/// Globally adaptive Gauss–Kronrod (G7/K15) integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKronrodAdaptive {
    absolute_accuracy: Real,
    relative_accuracy: Real,
    max_subdivisions: usize,
}

impl GaussKronrodAdaptive {
    /// Create an integrator with the given tolerances and a cap on the
    /// number of intervals in the partition.
    pub fn new(absolute_accuracy: Real, relative_accuracy: Real, max_subdivisions: usize) -> Self {
        Self {
            absolute_accuracy,
            relative_accuracy,
            max_subdivisions: max_subdivisions.max(1),
        }
    }

    /// The tolerance an estimate of magnitude `value` must meet.
    pub fn tolerance(&self, value: Real) -> Real {
        self.absolute_accuracy.max(self.relative_accuracy * value.abs())
    }

    /// Integrate `f` on `[a, b]`, returning the estimate with its error
    /// bound and evaluation count.
    ///
    /// Fails with [`Error::Integration`] carrying the best estimate when
    /// the partition reaches `max_subdivisions` intervals without meeting
    /// the tolerance, or when the integrand produces a non-finite value.
    pub fn integrate_with_estimate<F: Fn(Real) -> Real>(
        &self,
        f: F,
        a: Real,
        b: Real,
    ) -> Result<IntegrationOutcome> {
        if a == b {
            return Ok(IntegrationOutcome::ZERO);
        }

        let first = kronrod_15(&f, a, b);
        let mut evaluations = POINTS_PER_RULE;
        let mut value = first.value;
        let mut error = first.error;
        let mut heap = BinaryHeap::with_capacity(self.max_subdivisions);
        heap.push(first);

        loop {
            if !value.is_finite() || !error.is_finite() {
                return Err(Error::Integration {
                    estimate: value,
                    error_bound: Real::INFINITY,
                    tolerance: self.tolerance(value),
                    evaluations,
                });
            }
            if error <= self.tolerance(value) {
                return Ok(IntegrationOutcome {
                    value,
                    error_estimate: error,
                    evaluations,
                });
            }
            if heap.len() >= self.max_subdivisions {
                return Err(Error::Integration {
                    estimate: value,
                    error_bound: error,
                    tolerance: self.tolerance(value),
                    evaluations,
                });
            }
            let Some(worst) = heap.pop() else {
                unreachable!("partition is never empty");
            };
            let mid = 0.5 * (worst.a + worst.b);
            let left = kronrod_15(&f, worst.a, mid);
            let right = kronrod_15(&f, mid, worst.b);
            evaluations += 2 * POINTS_PER_RULE;
            value += left.value + right.value - worst.value;
            error += left.error + right.error - worst.error;
            heap.push(left);
            heap.push(right);
        }
    }
}

impl Default for GaussKronrodAdaptive {
    fn default() -> Self {
        Self::new(1e-12, 1e-10, 500)
    }
}
