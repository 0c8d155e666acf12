//! The stationary radial NLS system in first-order form.
//!
//! With u = (R, g), g = dR/dr:
//!
//!   dR/dr = g
//!   dg/dr = -(1/r) g - 2 R^3 + 2 R
//!
//! The regular part of the right-hand side is what `rhs` returns; the
//! -(1/r) g piece is singular at the origin and is carried separately by
//! `singular_matrix`, so `rhs` never divides by r and tolerates r = 0.
//! The coefficients are kept exactly in this coded form; the profile they
//! produce is the textbook Townes soliton under the radius rescaling
//! r -> r / sqrt(2).

use nalgebra::{DMatrix, DVector};

/// Regular right-hand side on a whole grid: u is 2 x N (row 0 = R,
/// row 1 = g), the result is 2 x N.
pub fn rhs(_r: &DVector<f64>, u: &DMatrix<f64>) -> DMatrix<f64> {
    let m = u.ncols();
    DMatrix::from_fn(2, m, |i, j| {
        if i == 0 {
            u[(1, j)]
        } else {
            let amp = u[(0, j)];
            -2.0 * amp * amp * amp + 2.0 * amp
        }
    })
}

/// Boundary residual: smoothness at the origin, g(0) = 0, and decay at
/// the truncated infinity, R(r_max) = 0.
pub fn boundary_residual(ya: &DVector<f64>, yb: &DVector<f64>) -> DVector<f64> {
    DVector::from_vec(vec![ya[1], yb[0]])
}

/// Constant coefficient S of the singular term S u / r.
pub fn singular_matrix() -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, -1.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rhs_is_vectorized_and_tolerates_origin() {
        let r = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        let u = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 0.5, -0.3, 0.0, 0.1]);
        let f = rhs(&r, &u);
        assert_eq!(f.shape(), (2, 3));
        // row 0 copies g
        assert_relative_eq!(f[(0, 0)], -0.3);
        assert_relative_eq!(f[(0, 2)], 0.1);
        // row 1 is -2R^3 + 2R
        assert_relative_eq!(f[(1, 0)], -2.0 * 8.0 + 2.0 * 2.0);
        assert_relative_eq!(f[(1, 1)], 0.0);
        assert_relative_eq!(f[(1, 2)], -0.25 + 1.0);
    }

    #[test]
    fn boundary_residual_pins_slope_and_tail() {
        let ya = DVector::from_vec(vec![2.2, 0.4]);
        let yb = DVector::from_vec(vec![1e-7, -1e-7]);
        let res = boundary_residual(&ya, &yb);
        assert_relative_eq!(res[0], 0.4);
        assert_relative_eq!(res[1], 1e-7);
    }

    #[test]
    fn fixed_points_of_the_amplitude_equation() {
        // dg/dr vanishes at R = 0 and R = 1 when g = 0
        let r = DVector::from_vec(vec![1.0, 1.0]);
        let u = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]);
        let f = rhs(&r, &u);
        assert_relative_eq!(f[(1, 0)], 0.0);
        assert_relative_eq!(f[(1, 1)], 0.0);
    }
}
