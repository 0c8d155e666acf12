//! Composite Simpson quadrature and finite-difference derivatives on a
//! uniformly spaced grid. These are the arithmetic half of the
//! post-processing stage: everything here is a pure function of already
//! tabulated samples.

/// Composite Simpson's rule for samples `y` on a uniform grid of spacing `h`.
///
/// An odd number of intervals is handled by applying Simpson's rule to the
/// leading even block and closing the last interval with the three-point
/// Newton-Cotes end formula, which keeps the overall O(h^4) accuracy.
pub fn simpson_uniform(y: &[f64], h: f64) -> f64 {
    assert!(h > 0.0, "grid spacing must be positive");
    let m = y.len();
    if m < 2 {
        return 0.0;
    }
    if m == 2 {
        return 0.5 * h * (y[0] + y[1]);
    }
    let intervals = m - 1;
    let even_intervals = if intervals % 2 == 0 {
        intervals
    } else {
        intervals - 1
    };
    let mut total = 0.0;
    let mut j = 0;
    while j < even_intervals {
        total += h / 3.0 * (y[j] + 4.0 * y[j + 1] + y[j + 2]);
        j += 2;
    }
    if intervals % 2 == 1 {
        // last interval via the quadratic through the final three samples
        let k = m - 1;
        total += h / 12.0 * (5.0 * y[k] + 8.0 * y[k - 1] - y[k - 2]);
    }
    total
}

/// Central-difference derivative on a uniform grid, one-sided at the ends
/// (the same stencil as numpy's `gradient`).
pub fn gradient_uniform(y: &[f64], h: f64) -> Vec<f64> {
    assert!(h > 0.0, "grid spacing must be positive");
    let m = y.len();
    assert!(m >= 2, "need at least two samples to differentiate");
    let mut g = vec![0.0; m];
    g[0] = (y[1] - y[0]) / h;
    g[m - 1] = (y[m - 1] - y[m - 2]) / h;
    for i in 1..m - 1 {
        g[i] = (y[i + 1] - y[i - 1]) / (2.0 * h);
    }
    g
}
