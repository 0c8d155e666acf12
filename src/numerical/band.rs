//! Banded LU factorization with partial pivoting.
//!
//! The Newton systems produced by the collocation method couple each mesh
//! node only to its neighbour, plus a handful of boundary rows pinned to the
//! first and last nodes. With separated boundary conditions the global
//! Jacobian is therefore banded, and a dense factorization (which would need
//! O((n*m)^2) memory, hopeless for meshes of 10^4 nodes) can be replaced by
//! an O(n*m) banded one.
//!
//! Storage is row-major: row `i` keeps the window of columns
//! `[i - kl, i + ku + kl]`. The extra `kl` superdiagonals absorb the fill-in
//! produced by row interchanges, as in the classic LAPACK `gbtrf` scheme.

use nalgebra::DVector;

/// Banded square matrix holding its own LU factorization after `factor()`.
#[derive(Debug, Clone)]
pub struct BandedLu {
    n: usize,
    kl: usize,
    ku: usize,
    /// rows[i][j - i + kl] = A[i][j]
    rows: Vec<Vec<f64>>,
    /// pivot row chosen at each elimination step
    piv: Vec<usize>,
    factored: bool,
}

impl BandedLu {
    /// Zero matrix of order `n` with `kl` subdiagonals and `ku` superdiagonals.
    pub fn new(n: usize, kl: usize, ku: usize) -> Self {
        assert!(n > 0);
        let width = 2 * kl + ku + 1;
        Self {
            n,
            kl,
            ku,
            rows: vec![vec![0.0; width]; n],
            piv: vec![0; n],
            factored: false,
        }
    }

    pub fn order(&self) -> usize {
        self.n
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> Option<usize> {
        let lo = i.saturating_sub(self.kl);
        let hi = (i + self.ku + self.kl).min(self.n - 1);
        if j < lo || j > hi {
            None
        } else {
            Some(j + self.kl - i)
        }
    }

    /// Set entry (i, j). Panics if the entry lies outside the band.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(!self.factored, "matrix already factored");
        let k = self
            .offset(i, j)
            .unwrap_or_else(|| panic!("entry ({i}, {j}) outside band"));
        self.rows[i][k] = value;
    }

    /// Entry (i, j); zero outside the band.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        match self.offset(i, j) {
            Some(k) => self.rows[i][k],
            None => 0.0,
        }
    }

    /// In-place LU with partial pivoting. Returns `false` when a pivot
    /// vanishes, i.e. the matrix is numerically singular.
    pub fn factor(&mut self) -> bool {
        let n = self.n;
        let kl = self.kl;
        let ku = self.ku;
        for k in 0..n {
            // pivot search in column k among the kl rows below the diagonal
            let last_row = (k + kl).min(n - 1);
            let mut p = k;
            let mut pmax = self.rows[k][kl].abs();
            for i in (k + 1)..=last_row {
                let v = self.rows[i][k + kl - i].abs();
                if v > pmax {
                    pmax = v;
                    p = i;
                }
            }
            if pmax == 0.0 {
                return false;
            }
            self.piv[k] = p;
            let last_col = (k + ku + kl).min(n - 1);
            if p != k {
                for j in k..=last_col {
                    let a = self.rows[k][j + kl - k];
                    let b = self.rows[p][j + kl - p];
                    self.rows[k][j + kl - k] = b;
                    self.rows[p][j + kl - p] = a;
                }
            }
            let pivot = self.rows[k][kl];
            for i in (k + 1)..=last_row {
                let l = self.rows[i][k + kl - i] / pivot;
                self.rows[i][k + kl - i] = l;
                if l != 0.0 {
                    for j in (k + 1)..=last_col {
                        let u = self.rows[k][j + kl - k];
                        if u != 0.0 {
                            self.rows[i][j + kl - i] -= l * u;
                        }
                    }
                }
            }
        }
        self.factored = true;
        true
    }

    /// Solve A x = b with the stored factorization.
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        assert!(self.factored, "factor() must succeed before solve()");
        assert_eq!(b.len(), self.n);
        let n = self.n;
        let kl = self.kl;
        let ku = self.ku;
        let mut x = b.clone();
        // forward pass: pivots and unit-lower factor
        for k in 0..n {
            let p = self.piv[k];
            if p != k {
                x.swap_rows(k, p);
            }
            let xk = x[k];
            if xk != 0.0 {
                let last_row = (k + kl).min(n - 1);
                for i in (k + 1)..=last_row {
                    x[i] -= self.rows[i][k + kl - i] * xk;
                }
            }
        }
        // back substitution with the upper factor (bandwidth ku + kl)
        for k in (0..n).rev() {
            let last_col = (k + ku + kl).min(n - 1);
            let mut s = x[k];
            for j in (k + 1)..=last_col {
                s -= self.rows[k][j + kl - k] * x[j];
            }
            x[k] = s / self.rows[k][kl];
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn to_dense(b: &BandedLu) -> DMatrix<f64> {
        let n = b.order();
        DMatrix::from_fn(n, n, |i, j| b.get(i, j))
    }

    #[test]
    fn tridiagonal_known_solution() {
        // -x_{i-1} + 2 x_i - x_{i+1} = h^2, the discrete Poisson problem
        let n = 11;
        let mut a = BandedLu::new(n, 1, 1);
        for i in 0..n {
            a.set(i, i, 2.0);
            if i > 0 {
                a.set(i, i - 1, -1.0);
            }
            if i + 1 < n {
                a.set(i, i + 1, -1.0);
            }
        }
        let dense = to_dense(&a);
        let b = DVector::from_element(n, 1.0);
        assert!(a.factor());
        let x = a.solve(&b);
        let residual = &dense * &x - &b;
        assert!(residual.amax() < 1e-12);
    }

    #[test]
    fn matches_dense_lu_with_pivoting() {
        // small diagonal entries force row interchanges
        let n = 12;
        let (kl, ku) = (2, 3);
        let mut a = BandedLu::new(n, kl, ku);
        for i in 0..n {
            for j in i.saturating_sub(kl)..=(i + ku).min(n - 1) {
                // deterministic pseudo-random fill, small diagonal
                let v = ((i * 7 + j * 13 + 3) % 17) as f64 / 17.0 - 0.5;
                let v = if i == j { v * 1e-3 } else { v };
                a.set(i, j, v);
            }
        }
        let dense = to_dense(&a);
        let b = DVector::from_fn(n, |i, _| (i as f64).sin() + 0.5);
        let x_dense = dense
            .clone()
            .lu()
            .solve(&b)
            .expect("dense LU should succeed");
        assert!(a.factor());
        let x_band = a.solve(&b);
        for i in 0..n {
            assert_relative_eq!(x_band[i], x_dense[i], epsilon = 1e-8, max_relative = 1e-8);
        }
    }

    #[test]
    fn singular_matrix_is_reported() {
        let mut a = BandedLu::new(4, 1, 1);
        // row of zeros
        a.set(0, 0, 1.0);
        a.set(1, 1, 0.0);
        a.set(2, 2, 1.0);
        a.set(3, 3, 1.0);
        assert!(!a.factor());
    }

    #[test]
    fn outside_band_reads_zero() {
        let a = BandedLu::new(5, 1, 1);
        assert_eq!(a.get(0, 4), 0.0);
        assert_eq!(a.get(4, 0), 0.0);
    }
}
