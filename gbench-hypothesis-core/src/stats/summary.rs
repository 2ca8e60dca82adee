//! Summary statistics over ordered samples.

/// Returns the `pctile`th value of a sorted sample using interpolation
/// method R8 from Hyndman and Fan (1996).
///
/// `xs` must be sorted ascending. `pctile` is capped to `[0, 1]`. Returns
/// NaN if `xs` is empty or `pctile` is NaN.
///
/// `percentile(xs, 0.5)` is the median; `0.25` and `0.75` give the first
/// and third quartiles.
pub fn percentile(xs: &[f64], pctile: f64) -> f64 {
    if xs.is_empty() || pctile.is_nan() {
        return f64::NAN;
    }
    let pctile = pctile.clamp(0.0, 1.0);
    let len = xs.len() as f64;
    let n = 1.0 / 3.0 + pctile * (len + 1.0 / 3.0);
    let frac = n.fract();
    let k = n.trunc();

    if k <= 0.0 {
        return xs[0];
    }
    let k = k as usize;
    if k >= xs.len() {
        return xs[xs.len() - 1];
    }
    xs[k - 1] + frac * (xs[k] - xs[k - 1])
}

/// Arithmetic mean computed with a running update, which stays accurate
/// for long sequences of large values. Returns NaN if `xs` is empty.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter()
        .enumerate()
        .fold(0.0, |m, (i, &x)| m + (x - m) / (i + 1) as f64)
}

/// Minimum and maximum of `xs`, or `(NaN, NaN)` if it is empty.
pub fn bounds(xs: &[f64]) -> (f64, f64) {
    let Some(&first) = xs.first() else {
        return (f64::NAN, f64::NAN);
    };
    xs.iter().fold((first, first), |(min, max), &x| {
        (if x < min { x } else { min }, if x > max { x } else { max })
    })
}
