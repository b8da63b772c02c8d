//! Fitting parametric transfer functions to sampled curves
//!
//! [`approximate_curve`] turns a lookup-table curve into an sRGB-ish
//! [`TransferFunction`] in two phases: a greedy linear fit of the toe, then a
//! Gauss-Newton fit of the power segment. The nonlinear phase fits the
//! *inverse* function, since the result is mostly used inverted as a
//! destination encoding, and scores candidates by table round-trip error.

use crate::error::{Error, Result};
use crate::icc::tags::Curve;
use crate::math::fast::{fmax, fmin, is_finite, ln, log2, pow};
use crate::math::{Matrix3x3, Vector3};
use crate::transfer::{INVERSE_TOLERANCE, SrgbishParams, TransferFunction};

/// Tolerances tried by [`approximate_curve`], tightest first
const TOLERANCES: [f32; 2] = [1.5 / 65535.0, 1.0 / 512.0];

/// Gauss-Newton iterations per tolerance
const GAUSS_NEWTON_STEPS: usize = 8;

/// Result of [`fit_linear`]: the line `c·x + f` covers `points` samples up to `d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub points: usize,
    pub c: f32,
    pub d: f32,
    pub f: f32,
}

/// Greedily fit `c·x + f` to the first samples of `curve`
///
/// Samples `n` evenly spaced points over [0, 1]. With `fit_offset`, `f` is
/// `curve(0)`; otherwise the line passes through the origin. A running
/// feasible-slope interval is narrowed by each sample's `±tol` band, and the
/// walk stops once it becomes empty. The returned line passes exactly through
/// the last sample whose own slope stayed inside the interval.
pub fn fit_linear(curve: &Curve<'_>, n: usize, tol: f32, fit_offset: bool) -> LinearFit {
    let dx = 1.0 / (n - 1) as f32;
    let f = if fit_offset { curve.eval(0.0) } else { 0.0 };

    let mut fit = LinearFit {
        points: 1,
        c: 0.0,
        d: 0.0,
        f,
    };

    let mut slope_min = f32::NEG_INFINITY;
    let mut slope_max = f32::INFINITY;
    for i in 1..n {
        let x = i as f32 * dx;
        let y = curve.eval(x);

        let slope_max_i = (y + tol - f) / x;
        let slope_min_i = (y - tol - f) / x;
        if slope_max_i < slope_min || slope_max < slope_min_i {
            break;
        }
        slope_max = fmin(slope_max, slope_max_i);
        slope_min = fmax(slope_min, slope_min_i);

        let cur_slope = (y - f) / x;
        if slope_min <= cur_slope && cur_slope <= slope_max {
            fit.points = i + 1;
            fit.c = cur_slope;
        }
    }

    fit.d = (fit.points - 1) as f32 * dx;
    fit
}

/// Worst `|x - inv(curve(x))|` over at least 256 evenly spaced samples
pub fn max_roundtrip_error(curve: &Curve<'_>, inv: &TransferFunction) -> f32 {
    let n = curve.table_entries().max(256);
    let dx = 1.0 / (n - 1) as f32;
    let mut err = 0.0f32;
    for i in 0..n {
        let x = i as f32 * dx;
        let y = curve.eval(x);
        err = fmax(err, (x - inv.eval(y)).abs());
    }
    err
}

/// True if `inv` undoes `curve` to within 1/512 everywhere
pub fn are_approximate_inverses(curve: &Curve<'_>, inv: &TransferFunction) -> bool {
    max_roundtrip_error(curve, inv) < INVERSE_TOLERANCE
}

fn invert_params(p: &SrgbishParams) -> Option<SrgbishParams> {
    TransferFunction::Srgbish(*p)
        .invert()
        .ok()
        .and_then(|inv| inv.as_srgbish().copied())
}

/// Residual `x - inv(curve(x))` of the inverse candidate `tf`, and its
/// gradient with respect to `g`, `a` and `b`
fn rg_nonlinear(x: f32, curve: &Curve<'_>, tf: &SrgbishParams) -> (f32, [f32; 3]) {
    let y = curve.eval(x);
    let SrgbishParams { g, a, b, c, d, f, .. } = *tf;
    let big_y = fmax(a * y + b, 0.0);
    let big_d = a * d + b;

    let dfdp = [
        ln(big_y) * pow(big_y, g) - ln(big_d) * pow(big_d, g),
        y * g * pow(big_y, g - 1.0) - d * g * pow(big_d, g - 1.0),
        g * pow(big_y, g - 1.0) - g * pow(big_d, g - 1.0),
    ];

    let f_inv = pow(big_y, g) - pow(big_d, g) + c * d + f;
    (x - f_inv, dfdp)
}

/// One Gauss-Newton update of `g`, `a`, `b` from `n` samples starting at `x0`
fn gauss_newton_step(curve: &Curve<'_>, tf: &mut SrgbishParams, x0: f32, dx: f32, n: usize) -> bool {
    let mut lhs = Matrix3x3::new([[0.0; 3]; 3]);
    let mut rhs = Vector3::default();

    for i in 0..n {
        let x = x0 + i as f32 * dx;
        let (resid, dfdp) = rg_nonlinear(x, curve, tf);
        for r in 0..3 {
            for c in 0..3 {
                lhs.m[r][c] += dfdp[r] * dfdp[c];
            }
            rhs.v[r] += dfdp[r] * resid;
        }
    }

    // An unused parameter leaves an all-zero row and column; pin it so the
    // normal equations stay invertible.
    for k in 0..3 {
        let row_zero = lhs.m[k].iter().all(|&v| v == 0.0);
        let col_zero = (0..3).all(|r| lhs.m[r][k] == 0.0);
        if row_zero && col_zero {
            lhs.m[k][k] = 1.0;
        }
    }

    let Ok(lhs_inv) = lhs.invert() else {
        return false;
    };

    let dp = lhs_inv.multiply_vec(&rhs);
    tf.g += dp.v[0];
    tf.a += dp.v[1];
    tf.b += dp.v[2];
    is_finite(tf.g) && is_finite(tf.a) && is_finite(tf.b)
}

/// Round-trip error of the inverse candidate after re-deriving it through
/// its own forward function. Infinite if either inversion fails.
fn max_roundtrip_error_checked(curve: &Curve<'_>, tf_inv: &SrgbishParams) -> f32 {
    let Some(tf) = invert_params(tf_inv) else {
        return f32::INFINITY;
    };
    let Some(tf_inv_again) = invert_params(&tf) else {
        return f32::INFINITY;
    };
    max_roundtrip_error(curve, &TransferFunction::Srgbish(tf_inv_again))
}

/// Restore the constraints Gauss-Newton does not model: `a ≥ 0`,
/// `a·d + b ≥ 0`, and continuity at `d` through `e`.
fn fixup(tf: &mut SrgbishParams) -> bool {
    if tf.a < 0.0 {
        return false;
    }
    if tf.a * tf.d + tf.b < 0.0 {
        tf.b = -tf.a * tf.d;
    }
    tf.e = tf.c * tf.d + tf.f - pow(tf.a * tf.d + tf.b, tf.g);
    is_finite(tf.e)
}

/// Fit the power segment of the inverse function `tf` to samples `l..n`
fn fit_nonlinear(curve: &Curve<'_>, l: usize, n: usize, tf: &mut SrgbishParams) -> bool {
    if !fixup(tf) {
        return false;
    }

    let dx = 1.0 / (n - 1) as f32;

    let mut best_tf = *tf;
    let mut best_max_error = f32::INFINITY;

    let init_error = max_roundtrip_error_checked(curve, tf);
    if init_error < best_max_error {
        best_max_error = init_error;
        best_tf = *tf;
    }

    for _ in 0..GAUSS_NEWTON_STEPS {
        if !gauss_newton_step(curve, tf, l as f32 * dx, dx, n - l) || !fixup(tf) {
            *tf = best_tf;
            return is_finite(best_max_error);
        }

        let max_error = max_roundtrip_error_checked(curve, tf);
        if max_error < best_max_error {
            best_max_error = max_error;
            best_tf = *tf;
        }
    }

    *tf = best_tf;
    is_finite(best_max_error)
}

/// Approximate a table curve with an sRGB-ish transfer function
///
/// Returns the function together with its maximum round-trip error through
/// its own inverse. Parametric curves, single-entry tables and tables with
/// more than `i32::MAX` entries are rejected.
pub fn approximate_curve(curve: &Curve<'_>) -> Result<(TransferFunction, f32)> {
    let n = curve.table_entries();
    if n <= 1 || n > i32::MAX as usize {
        return Err(Error::ApproximationFailed);
    }
    let dx = 1.0 / (n - 1) as f32;

    let mut best: Option<(SrgbishParams, f32)> = None;
    let mut max_error = f32::INFINITY;

    for tol in TOLERANCES {
        let lin = fit_linear(curve, n, tol, false);
        let mut tf = SrgbishParams {
            c: lin.c,
            d: lin.d,
            f: 0.0,
            ..SrgbishParams::default()
        };

        if lin.points == n {
            // Entirely linear: fold into the power segment with g = 1, d = 0.
            tf.g = 1.0;
            tf.a = tf.c;
            tf.b = tf.f;
            tf.c = 0.0;
            tf.d = 0.0;
            tf.e = 0.0;
            tf.f = 0.0;
        } else if lin.points == n - 1 {
            // Two nonlinear points: the line through them is exact.
            let x_hi = (n - 1) as f32 * dx;
            let x_lo = (n - 2) as f32 * dx;
            tf.g = 1.0;
            tf.a = (curve.eval(x_hi) - curve.eval(x_lo)) / dx;
            tf.b = curve.eval(x_lo) - tf.a * x_lo;
            tf.e = 0.0;
        } else {
            // Initial guess: pure gamma through the midpoint of the tail.
            let mid = (lin.points + n) / 2;
            let mid_x = mid as f32 / (n - 1) as f32;
            let mid_y = curve.eval(mid_x);
            tf.g = log2(mid_y) / log2(mid_x);
            tf.a = 1.0;
            tf.b = 0.0;
            tf.e = tf.c * tf.d + tf.f - pow(tf.a * tf.d + tf.b, tf.g);

            let Some(mut tf_inv) = invert_params(&tf) else {
                continue;
            };
            if !fit_nonlinear(curve, lin.points, n, &mut tf_inv) {
                continue;
            }
            let Some(fitted) = invert_params(&tf_inv) else {
                continue;
            };
            tf = fitted;
        }

        if !tf.is_valid() {
            continue;
        }
        let Some(tf_inv) = invert_params(&tf) else {
            continue;
        };

        let err = max_roundtrip_error(curve, &TransferFunction::Srgbish(tf_inv));
        if max_error > err {
            max_error = err;
            best = Some((tf, tol));
        }
    }

    match best {
        Some((tf, tol)) if is_finite(max_error) => {
            tracing::trace!(entries = n, tolerance = tol, max_error, "approximated table curve");
            Ok((TransferFunction::Srgbish(tf), max_error))
        }
        _ => Err(Error::ApproximationFailed),
    }
}
