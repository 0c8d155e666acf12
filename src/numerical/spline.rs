//! Piecewise-cubic C1 interpolant for vector-valued functions.
//!
//! This is the "solution object" a collocation solve hands back: on every
//! mesh interval the solution is the cubic matching values and derivatives
//! at both endpoints (the coefficient formulas are those of
//! scipy.interpolate.CubicSpline), so the interpolant and its first
//! derivative are continuous across knots and the ODE is satisfied at the
//! collocation points.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// strictly increasing knots
    x: Vec<f64>,
    /// coefficients per interval and component, highest degree first
    c: Vec<Vec<[f64; 4]>>,
    dim: usize,
}

impl CubicSpline {
    /// Build the Hermite cubic through values `y` (dim x m) and derivatives
    /// `yp` (dim x m) at knots `x` (m, strictly increasing).
    pub fn from_values_and_derivatives(
        x: &DVector<f64>,
        y: &DMatrix<f64>,
        yp: &DMatrix<f64>,
    ) -> Self {
        let m = x.len();
        assert!(m >= 2, "need at least two knots");
        let (dim, cols) = y.shape();
        assert_eq!(cols, m, "value columns must match knot count");
        assert_eq!(yp.shape(), (dim, m), "derivative shape must match values");
        let mut c = Vec::with_capacity(m - 1);
        for j in 0..m - 1 {
            let h = x[j + 1] - x[j];
            assert!(h > 0.0, "knots must be strictly increasing");
            let mut interval = Vec::with_capacity(dim);
            for i in 0..dim {
                let slope = (y[(i, j + 1)] - y[(i, j)]) / h;
                let t = (yp[(i, j)] + yp[(i, j + 1)] - 2.0 * slope) / h;
                interval.push([
                    t / h,
                    (slope - yp[(i, j)]) / h - t,
                    yp[(i, j)],
                    y[(i, j)],
                ]);
            }
            c.push(interval);
        }
        Self {
            x: x.iter().cloned().collect(),
            c,
            dim,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Domain covered by the knots.
    pub fn span(&self) -> (f64, f64) {
        (self.x[0], *self.x.last().unwrap())
    }

    /// Interval index for evaluation point `r`; evaluation outside the span
    /// extrapolates with the edge polynomial.
    fn interval(&self, r: f64) -> usize {
        let last = self.c.len() - 1;
        if r <= self.x[0] {
            return 0;
        }
        if r >= self.x[last] {
            return last;
        }
        // rightmost knot <= r
        match self
            .x
            .binary_search_by(|probe| probe.partial_cmp(&r).unwrap())
        {
            Ok(k) => k.min(last),
            Err(k) => k - 1,
        }
    }

    /// Value of every component at `r`.
    pub fn eval(&self, r: f64) -> DVector<f64> {
        let j = self.interval(r);
        let s = r - self.x[j];
        DVector::from_iterator(
            self.dim,
            self.c[j]
                .iter()
                .map(|p| ((p[0] * s + p[1]) * s + p[2]) * s + p[3]),
        )
    }

    /// First derivative of every component at `r`.
    pub fn eval_derivative(&self, r: f64) -> DVector<f64> {
        let j = self.interval(r);
        let s = r - self.x[j];
        DVector::from_iterator(
            self.dim,
            self.c[j]
                .iter()
                .map(|p| (3.0 * p[0] * s + 2.0 * p[1]) * s + p[2]),
        )
    }

    /// Values on a whole grid, returned as dim x len matrix.
    pub fn eval_many(&self, pts: &[f64]) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim, pts.len());
        for (col, &r) in pts.iter().enumerate() {
            out.set_column(col, &self.eval(r));
        }
        out
    }

    /// First derivatives on a whole grid, dim x len.
    pub fn eval_derivative_many(&self, pts: &[f64]) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim, pts.len());
        for (col, &r) in pts.iter().enumerate() {
            out.set_column(col, &self.eval_derivative(r));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(x: f64) -> f64 {
        2.0 * x * x * x - x * x + 3.0 * x - 5.0
    }

    fn cubic_prime(x: f64) -> f64 {
        6.0 * x * x - 2.0 * x + 3.0
    }

    fn spline_of_cubic() -> CubicSpline {
        let m = 7;
        let x = DVector::from_fn(m, |i, _| i as f64 * 0.5);
        let y = DMatrix::from_fn(1, m, |_, j| cubic(x[j]));
        let yp = DMatrix::from_fn(1, m, |_, j| cubic_prime(x[j]));
        CubicSpline::from_values_and_derivatives(&x, &y, &yp)
    }

    #[test]
    fn reproduces_cubic_exactly() {
        let sp = spline_of_cubic();
        for k in 0..61 {
            let r = k as f64 * 0.05;
            assert_relative_eq!(sp.eval(r)[0], cubic(r), epsilon = 1e-10, max_relative = 1e-10);
            assert_relative_eq!(
                sp.eval_derivative(r)[0],
                cubic_prime(r),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn interpolates_knots_of_both_components() {
        let m = 5;
        let x = DVector::from_fn(m, |i, _| i as f64);
        let y = DMatrix::from_fn(2, m, |i, j| if i == 0 { (j as f64).sin() } else { j as f64 });
        let yp = DMatrix::from_fn(2, m, |i, j| if i == 0 { (j as f64).cos() } else { 1.0 });
        let sp = CubicSpline::from_values_and_derivatives(&x, &y, &yp);
        for j in 0..m {
            let v = sp.eval(x[j]);
            assert_relative_eq!(v[0], y[(0, j)], epsilon = 1e-12);
            assert_relative_eq!(v[1], y[(1, j)], epsilon = 1e-12);
        }
    }

    #[test]
    fn extrapolates_with_edge_polynomial() {
        let sp = spline_of_cubic();
        // a cubic is represented exactly, so extrapolation is exact too
        assert_relative_eq!(sp.eval(-0.25)[0], cubic(-0.25), epsilon = 1e-9, max_relative = 1e-9);
        assert_relative_eq!(sp.eval(3.25)[0], cubic(3.25), epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn eval_many_matches_pointwise() {
        let sp = spline_of_cubic();
        let pts: Vec<f64> = (0..13).map(|k| k as f64 * 0.25).collect();
        let mat = sp.eval_many(&pts);
        for (col, &r) in pts.iter().enumerate() {
            assert_relative_eq!(mat[(0, col)], sp.eval(r)[0], epsilon = 1e-14);
        }
    }
}
