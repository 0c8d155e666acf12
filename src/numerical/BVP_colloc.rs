//! Collocation boundary-value solver with singular-term handling.
//!
//! Solves nonlinear two-point BVPs
//!
//!   y'(x) = f(x, y) + S y / (x - a),   x in [a, b],
//!   g(y(a), y(b)) = 0
//!
//! by the 4th order method of the SciPy/MATLAB family: the solution is a
//! C1 piecewise cubic collocated at interval midpoints, the resulting
//! nonlinear system is solved by Newton's method with Armijo backtracking,
//! per-interval RMS residuals are estimated by 5-point Lobatto quadrature
//! and the mesh is refined where they exceed the tolerance.
//!
//! The optional constant matrix `S` carries a coefficient of y/(x - a) that
//! is singular at the left endpoint. It is folded into the right-hand side
//! away from `a`; at `a` itself the limit value D f(a, y(a)) with
//! D = pinv(I - S) is used and the initial value is projected onto the
//! admissible subspace by B = I - pinv(S) S. This is the regularization a
//! solver must provide before a 1/(x - a) coefficient can be collocated at
//! the boundary node.
//!
//! Boundary conditions must be separated (each residual component depends
//! on one endpoint only); this keeps the Newton matrices banded, which is
//! what makes meshes of 10^4 nodes tractable.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use super::band::BandedLu;
use super::spline::CubicSpline;

const EPS: f64 = f64::EPSILON;

/// Right-hand side f(x, y): given the full grid (m,) and state (n, m),
/// returns the (n, m) matrix of derivatives. Must be vectorized over the
/// grid and must not divide by x itself; singular coefficients go through
/// the `S` matrix.
pub type RhsFn<'a> = dyn Fn(&DVector<f64>, &DMatrix<f64>) -> DMatrix<f64> + 'a;

/// Boundary residual g(ya, yb) -> (n,).
pub type BcFn<'a> = dyn Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64> + 'a;

#[derive(Debug, Error)]
pub enum BvpError {
    #[error("mesh must contain at least 3 strictly increasing nodes")]
    BadMesh,
    #[error("initial guess is {0}x{1}, expected {2} columns to match the mesh")]
    BadGuess(usize, usize, usize),
    #[error("rhs returned shape ({0}, {1}), expected ({2}, {3})")]
    BadRhsShape(usize, usize, usize, usize),
    #[error("boundary residual has {0} components, expected {1}")]
    BadBoundaryResidual(usize, usize),
    #[error("boundary conditions couple both endpoints; only separated conditions are supported")]
    CoupledBoundaryConditions,
    #[error("singular matrix is {0}x{1}, expected {2}x{2}")]
    BadSingularMatrix(usize, usize, usize),
    #[error("cannot pseudo-invert the singular-term matrix: {0}")]
    SingularTermInversion(&'static str),
}

/// Termination status of the solve. Anything but `Converged` means the
/// returned profile did not meet the tolerances and must not be
/// post-processed as if it had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvpStatus {
    Converged,
    MaxNodesExceeded,
    SingularJacobian,
    BcToleranceNotMet,
}

impl BvpStatus {
    pub fn message(&self) -> &'static str {
        match self {
            BvpStatus::Converged => "the algorithm converged to the desired accuracy",
            BvpStatus::MaxNodesExceeded => "the maximum number of mesh nodes is exceeded",
            BvpStatus::SingularJacobian => {
                "a singular Jacobian was encountered when solving the collocation system"
            }
            BvpStatus::BcToleranceNotMet => {
                "the solver was unable to satisfy the boundary condition tolerance"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BvpSettings {
    /// target RMS of the relative collocation residuals per interval
    pub tol: f64,
    /// tolerance on the boundary residual components
    pub bc_tol: f64,
    /// hard cap on mesh size during refinement
    pub max_nodes: usize,
    /// outer mesh-refinement sweeps before giving up on the BC tolerance
    pub max_mesh_sweeps: usize,
}

impl Default for BvpSettings {
    fn default() -> Self {
        Self {
            tol: 1e-3,
            bc_tol: 1e-3,
            max_nodes: 100_000,
            max_mesh_sweeps: 10,
        }
    }
}

/// Converged (or best-effort, see `status`) solution of the BVP.
#[derive(Debug, Clone)]
pub struct BvpSolution {
    /// C1 cubic interpolant over the final mesh
    pub sol: CubicSpline,
    /// final mesh nodes
    pub x: DVector<f64>,
    /// state values at the mesh nodes (n, m)
    pub y: DMatrix<f64>,
    /// state derivatives at the mesh nodes (n, m)
    pub yp: DMatrix<f64>,
    /// RMS relative residual per mesh interval
    pub rms_residuals: DVector<f64>,
    /// outer refinement sweeps performed
    pub niter: usize,
    pub status: BvpStatus,
}

impl BvpSolution {
    pub fn success(&self) -> bool {
        self.status == BvpStatus::Converged
    }

    pub fn max_rms_residual(&self) -> f64 {
        self.rms_residuals.iter().cloned().fold(0.0, f64::max)
    }
}

/// Collocation residuals plus the RHS evaluations they reuse.
///
/// The C1 cubic on each interval has its midpoint value determined by the
/// endpoint values and derivatives; the residual compares the Simpson
/// increment of the RHS against the actual increment of y.
fn collocation_fun(
    rhs: &RhsFn,
    y: &DMatrix<f64>,
    x: &DVector<f64>,
    h: &DVector<f64>,
) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
    let (n, m) = y.shape();
    let f = rhs(x, y);
    let mut x_middle = DVector::zeros(m - 1);
    let mut y_middle = DMatrix::zeros(n, m - 1);
    for j in 0..m - 1 {
        x_middle[j] = x[j] + 0.5 * h[j];
        for i in 0..n {
            y_middle[(i, j)] =
                0.5 * (y[(i, j + 1)] + y[(i, j)]) - 0.125 * h[j] * (f[(i, j + 1)] - f[(i, j)]);
        }
    }
    let f_middle = rhs(&x_middle, &y_middle);
    let mut col_res = DMatrix::zeros(n, m - 1);
    for j in 0..m - 1 {
        for i in 0..n {
            col_res[(i, j)] = y[(i, j + 1)]
                - y[(i, j)]
                - h[j] / 6.0 * (f[(i, j)] + f[(i, j + 1)] + 4.0 * f_middle[(i, j)]);
        }
    }
    (col_res, y_middle, f, f_middle)
}

/// Forward-difference Jacobians of the RHS at every grid column, one n x n
/// block per column. Each state component is perturbed across the whole
/// grid at once, so the cost is n full-grid RHS evaluations.
fn estimate_rhs_jac(
    rhs: &RhsFn,
    x: &DVector<f64>,
    y: &DMatrix<f64>,
    f0: &DMatrix<f64>,
) -> Vec<DMatrix<f64>> {
    let (n, m) = y.shape();
    let mut jacs = vec![DMatrix::zeros(n, n); m];
    for comp in 0..n {
        let mut y_pert = y.clone();
        let mut steps = vec![0.0; m];
        for j in 0..m {
            let hstep = EPS.sqrt() * (1.0 + y[(comp, j)].abs());
            steps[j] = hstep;
            y_pert[(comp, j)] += hstep;
        }
        let f_new = rhs(x, &y_pert);
        for j in 0..m {
            for row in 0..n {
                jacs[j][(row, comp)] = (f_new[(row, j)] - f0[(row, j)]) / steps[j];
            }
        }
    }
    jacs
}

/// Forward-difference Jacobians of the boundary residual w.r.t. both
/// endpoint states.
fn estimate_bc_jac(
    bc: &BcFn,
    ya: &DVector<f64>,
    yb: &DVector<f64>,
    bc0: &DVector<f64>,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = ya.len();
    let mut dbc_dya = DMatrix::zeros(n, n);
    let mut dbc_dyb = DMatrix::zeros(n, n);
    for i in 0..n {
        let hstep = EPS.sqrt() * (1.0 + ya[i].abs());
        let mut ya_pert = ya.clone();
        ya_pert[i] += hstep;
        let bc_new = bc(&ya_pert, yb);
        for row in 0..n {
            dbc_dya[(row, i)] = (bc_new[row] - bc0[row]) / hstep;
        }
        let hstep = EPS.sqrt() * (1.0 + yb[i].abs());
        let mut yb_pert = yb.clone();
        yb_pert[i] += hstep;
        let bc_new = bc(ya, &yb_pert);
        for row in 0..n {
            dbc_dyb[(row, i)] = (bc_new[row] - bc0[row]) / hstep;
        }
    }
    (dbc_dya, dbc_dyb)
}

/// Classify every boundary residual row as a left or a right condition from
/// its Jacobian rows. Rows depending on both endpoints are rejected.
fn split_bc_rows(
    dbc_dya: &DMatrix<f64>,
    dbc_dyb: &DMatrix<f64>,
) -> Result<(Vec<usize>, Vec<usize>), BvpError> {
    let n = dbc_dya.nrows();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for row in 0..n {
        let la = (0..n).map(|c| dbc_dya[(row, c)].abs()).fold(0.0, f64::max);
        let lb = (0..n).map(|c| dbc_dyb[(row, c)].abs()).fold(0.0, f64::max);
        if lb <= 1e-10 * (1.0 + la) {
            left.push(row);
        } else if la <= 1e-10 * (1.0 + lb) {
            right.push(row);
        } else {
            return Err(BvpError::CoupledBoundaryConditions);
        }
    }
    Ok((left, right))
}

/// Residual vector in the banded row ordering:
/// [left BC rows | collocation blocks | right BC rows].
fn stack_residuals(
    col_res: &DMatrix<f64>,
    bc_res: &DVector<f64>,
    left: &[usize],
    right: &[usize],
) -> DVector<f64> {
    let (n, m1) = col_res.shape();
    let p = left.len();
    let mut res = DVector::zeros(n * (m1 + 1));
    for (t, &row) in left.iter().enumerate() {
        res[t] = bc_res[row];
    }
    for j in 0..m1 {
        for i in 0..n {
            res[p + j * n + i] = col_res[(i, j)];
        }
    }
    for (t, &row) in right.iter().enumerate() {
        res[p + m1 * n + t] = bc_res[row];
    }
    res
}

/// Banded global Jacobian of the collocation + BC system. Unknowns are the
/// node states flattened column-major; with `p` left conditions the
/// bandwidths are kl = n - 1 + p, ku = 2n - 1 - p.
#[allow(clippy::too_many_arguments)]
fn assemble_jacobian(
    n: usize,
    m: usize,
    h: &DVector<f64>,
    df_dy: &[DMatrix<f64>],
    df_dy_middle: &[DMatrix<f64>],
    dbc_dya: &DMatrix<f64>,
    dbc_dyb: &DMatrix<f64>,
    left: &[usize],
    right: &[usize],
) -> BandedLu {
    let p = left.len();
    let kl = n - 1 + p;
    let ku = 2 * n - 1 - p;
    let eye = DMatrix::<f64>::identity(n, n);
    let mut band = BandedLu::new(n * m, kl, ku);
    for (t, &row) in left.iter().enumerate() {
        for c in 0..n {
            band.set(t, c, dbc_dya[(row, c)]);
        }
    }
    for j in 0..m - 1 {
        let hj = h[j];
        let jm = &df_dy_middle[j];
        let l_block =
            -&eye - (hj / 6.0) * (&df_dy[j] + 2.0 * jm) - (hj * hj / 12.0) * (jm * &df_dy[j]);
        let r_block = &eye - (hj / 6.0) * (&df_dy[j + 1] + 2.0 * jm)
            + (hj * hj / 12.0) * (jm * &df_dy[j + 1]);
        for i in 0..n {
            for c in 0..n {
                band.set(p + j * n + i, j * n + c, l_block[(i, c)]);
                band.set(p + j * n + i, (j + 1) * n + c, r_block[(i, c)]);
            }
        }
    }
    for (t, &row) in right.iter().enumerate() {
        for c in 0..n {
            band.set(p + (m - 1) * n + t, (m - 1) * n + c, dbc_dyb[(row, c)]);
        }
    }
    band
}

/// Damped Newton iteration on the collocation system over a fixed mesh.
/// Returns the improved node values and a flag for a singular Jacobian.
fn solve_newton(
    rhs: &RhsFn,
    bc: &BcFn,
    x: &DVector<f64>,
    h: &DVector<f64>,
    mut y: DMatrix<f64>,
    tol: f64,
    bc_tol: f64,
) -> Result<(DMatrix<f64>, bool), BvpError> {
    let (n, m) = y.shape();
    let max_iter = 8;
    let max_njev = 4;
    let sigma = 0.2; // Armijo constant
    let tau = 0.5; // step shrink factor
    let n_trial = 4;
    let tol_r: DVector<f64> = h.map(|hi| 2.0 / 3.0 * hi * 5e-2 * tol);

    let mut njev = 0;
    let mut recompute_jac = true;
    let mut lu: Option<BandedLu> = None;
    let mut left: Vec<usize> = Vec::new();
    let mut right: Vec<usize> = Vec::new();
    let mut cost = 0.0;

    for _ in 0..max_iter {
        let (col_res, y_middle, f, f_middle) = collocation_fun(rhs, &y, x, h);
        let ya: DVector<f64> = y.column(0).into();
        let yb: DVector<f64> = y.column(m - 1).into();
        let bc_res = bc(&ya, &yb);

        if recompute_jac {
            let df_dy = estimate_rhs_jac(rhs, x, &y, &f);
            let mut x_middle = DVector::zeros(m - 1);
            for j in 0..m - 1 {
                x_middle[j] = x[j] + 0.5 * h[j];
            }
            let df_dy_middle = estimate_rhs_jac(rhs, &x_middle, &y_middle, &f_middle);
            let (dbc_dya, dbc_dyb) = estimate_bc_jac(bc, &ya, &yb, &bc_res);
            let (l, r) = split_bc_rows(&dbc_dya, &dbc_dyb)?;
            left = l;
            right = r;
            let mut band = assemble_jacobian(
                n, m, h, &df_dy, &df_dy_middle, &dbc_dya, &dbc_dyb, &left, &right,
            );
            if !band.factor() {
                return Ok((y, true));
            }
            let res = stack_residuals(&col_res, &bc_res, &left, &right);
            let step = band.solve(&res);
            cost = step.dot(&step);
            lu = Some(band);
            njev += 1;
        }
        let lu_ref = lu.as_ref().expect("factorization present after first pass");

        let res = stack_residuals(&col_res, &bc_res, &left, &right);
        let step = lu_ref.solve(&res);
        // the unknowns are the node states flattened column-major
        let mut y_step = DMatrix::zeros(n, m);
        for j in 0..m {
            for i in 0..n {
                y_step[(i, j)] = step[j * n + i];
            }
        }

        // Armijo backtracking on the Newton decrement
        let mut alpha = 1.0;
        let mut accepted = false;
        for trial in 0..=n_trial {
            let y_new = &y - alpha * &y_step;
            let (col_res_new, _, _, _) = collocation_fun(rhs, &y_new, x, h);
            let bc_res_new = bc(&y_new.column(0).into(), &y_new.column(m - 1).into());
            let res_new = stack_residuals(&col_res_new, &bc_res_new, &left, &right);
            let step_new = lu_ref.solve(&res_new);
            let cost_new = step_new.dot(&step_new);
            if cost_new < (1.0 - 2.0 * alpha * sigma) * cost {
                y = y_new;
                cost = cost_new;
                accepted = true;
                break;
            }
            if trial < n_trial {
                alpha *= tau;
            }
        }
        // if no trial gave sufficient decrease the iterate is kept unchanged
        // and the Jacobian is rebuilt on the next pass

        let (col_res_fin, _, _, f_middle_fin) = collocation_fun(rhs, &y, x, h);
        let bc_res_fin = bc(&y.column(0).into(), &y.column(m - 1).into());
        let colloc_ok = (0..m - 1).all(|j| {
            (0..n).all(|i| col_res_fin[(i, j)].abs() < tol_r[j] * (1.0 + f_middle_fin[(i, j)].abs()))
        });
        let bc_ok = bc_res_fin.iter().all(|r| r.abs() < bc_tol);
        if colloc_ok && bc_ok {
            break;
        }

        recompute_jac = !(accepted && alpha == 1.0);
        if njev >= max_njev {
            break;
        }
    }

    Ok((y, false))
}

/// Per-interval RMS of the relative ODE residual y' - f, integrated by
/// 5-point Lobatto quadrature over each interval.
fn estimate_rms_residuals(
    rhs: &RhsFn,
    sol: &CubicSpline,
    x: &DVector<f64>,
    h: &DVector<f64>,
    r_middle: &DMatrix<f64>,
    f_middle: &DMatrix<f64>,
) -> DVector<f64> {
    let (n, m1) = r_middle.shape();
    let s_rel = (3.0f64 / 7.0).sqrt();
    let mut x1 = DVector::zeros(m1);
    let mut x2 = DVector::zeros(m1);
    for j in 0..m1 {
        let mid = x[j] + 0.5 * h[j];
        let s = 0.5 * h[j] * s_rel;
        x1[j] = mid + s;
        x2[j] = mid - s;
    }
    let pts1: Vec<f64> = x1.iter().cloned().collect();
    let pts2: Vec<f64> = x2.iter().cloned().collect();
    let y1 = sol.eval_many(&pts1);
    let y2 = sol.eval_many(&pts2);
    let y1p = sol.eval_derivative_many(&pts1);
    let y2p = sol.eval_derivative_many(&pts2);
    let f1 = rhs(&x1, &y1);
    let f2 = rhs(&x2, &y2);

    let mut rms = DVector::zeros(m1);
    for j in 0..m1 {
        let mut sum_mid = 0.0;
        let mut sum_1 = 0.0;
        let mut sum_2 = 0.0;
        for i in 0..n {
            let rm = r_middle[(i, j)] / (1.0 + f_middle[(i, j)].abs());
            let r1 = (y1p[(i, j)] - f1[(i, j)]) / (1.0 + f1[(i, j)].abs());
            let r2 = (y2p[(i, j)] - f2[(i, j)]) / (1.0 + f2[(i, j)].abs());
            sum_mid += rm * rm;
            sum_1 += r1 * r1;
            sum_2 += r2 * r2;
        }
        let integral = 0.5 * (32.0 / 45.0 * sum_mid + 49.0 / 90.0 * (sum_1 + sum_2));
        rms[j] = integral.sqrt();
    }
    rms
}

/// Insert one midpoint into each `insert_1` interval and two thirds-points
/// into each `insert_2` interval.
fn modify_mesh(x: &DVector<f64>, insert_1: &[usize], insert_2: &[usize]) -> DVector<f64> {
    let m = x.len();
    let mut add = vec![0u8; m - 1];
    for &j in insert_1 {
        add[j] = 1;
    }
    for &j in insert_2 {
        add[j] = 2;
    }
    let mut pts = Vec::with_capacity(m + insert_1.len() + 2 * insert_2.len());
    for j in 0..m - 1 {
        pts.push(x[j]);
        match add[j] {
            1 => pts.push(0.5 * (x[j] + x[j + 1])),
            2 => {
                pts.push((2.0 * x[j] + x[j + 1]) / 3.0);
                pts.push((x[j] + 2.0 * x[j + 1]) / 3.0);
            }
            _ => {}
        }
    }
    pts.push(x[m - 1]);
    DVector::from_vec(pts)
}

/// Solve the boundary value problem on mesh `x0` starting from guess `y0`
/// (n rows, one column per node).
pub fn solve_bvp(
    rhs: &RhsFn,
    bc: &BcFn,
    x0: DVector<f64>,
    y0: DMatrix<f64>,
    singular: Option<DMatrix<f64>>,
    settings: &BvpSettings,
) -> Result<BvpSolution, BvpError> {
    let mut x = x0;
    let mut y = y0;
    let n = y.nrows();
    let m0 = x.len();
    if m0 < 3 || !(0..m0 - 1).all(|j| x[j + 1] > x[j]) {
        return Err(BvpError::BadMesh);
    }
    if y.ncols() != m0 {
        return Err(BvpError::BadGuess(n, y.ncols(), m0));
    }
    let a = x[0];

    // fold the singular term into the RHS; see the module docs
    let wrapped: Box<RhsFn<'_>> = match singular {
        None => Box::new(move |xg: &DVector<f64>, yg: &DMatrix<f64>| rhs(xg, yg)),
        Some(s) => {
            if s.shape() != (n, n) {
                return Err(BvpError::BadSingularMatrix(s.nrows(), s.ncols(), n));
            }
            let eye = DMatrix::<f64>::identity(n, n);
            let d = (&eye - &s)
                .pseudo_inverse(1e-12)
                .map_err(BvpError::SingularTermInversion)?;
            let b_proj = &eye
                - s.clone()
                    .pseudo_inverse(1e-12)
                    .map_err(BvpError::SingularTermInversion)?
                    * &s;
            // admissible initial value: the component multiplied by the
            // singular coefficient must vanish at the boundary node
            let ya_proj = &b_proj * y.column(0);
            y.set_column(0, &ya_proj);
            Box::new(move |xg: &DVector<f64>, yg: &DMatrix<f64>| {
                let mut f = rhs(xg, yg);
                for j in 0..xg.len() {
                    if xg[j] == a {
                        let col = &d * f.column(j);
                        f.set_column(j, &col);
                    } else {
                        let col = f.column(j) + &s * yg.column(j) / (xg[j] - a);
                        f.set_column(j, &col);
                    }
                }
                f
            })
        }
    };

    // shape validation before entering the iteration
    let f_test = wrapped(&x, &y);
    if f_test.shape() != (n, m0) {
        return Err(BvpError::BadRhsShape(
            f_test.nrows(),
            f_test.ncols(),
            n,
            m0,
        ));
    }
    let bc_test = bc(&y.column(0).into(), &y.column(m0 - 1).into());
    if bc_test.len() != n {
        return Err(BvpError::BadBoundaryResidual(bc_test.len(), n));
    }

    let status;
    let mut sweep = 0;
    loop {
        let m = x.len();
        let h = DVector::from_fn(m - 1, |j, _| x[j + 1] - x[j]);

        let (y_new, newton_singular) =
            solve_newton(&*wrapped, bc, &x, &h, y.clone(), settings.tol, settings.bc_tol)?;
        y = y_new;
        sweep += 1;

        if newton_singular {
            status = BvpStatus::SingularJacobian;
            break;
        }

        let (col_res, _, f, f_middle) = collocation_fun(&*wrapped, &y, &x, &h);
        let bc_res = bc(&y.column(0).into(), &y.column(m - 1).into());
        let max_bc_res = bc_res.iter().map(|r| r.abs()).fold(0.0, f64::max);

        let mut r_middle = DMatrix::zeros(n, m - 1);
        for j in 0..m - 1 {
            for i in 0..n {
                r_middle[(i, j)] = 1.5 * col_res[(i, j)] / h[j];
            }
        }
        let sol = CubicSpline::from_values_and_derivatives(&x, &y, &f);
        let rms_res = estimate_rms_residuals(&*wrapped, &sol, &x, &h, &r_middle, &f_middle);
        let max_rms = rms_res.iter().cloned().fold(0.0, f64::max);

        let mut insert_1 = Vec::new();
        let mut insert_2 = Vec::new();
        for j in 0..m - 1 {
            if rms_res[j] > settings.tol && rms_res[j] < 100.0 * settings.tol {
                insert_1.push(j);
            } else if rms_res[j] >= 100.0 * settings.tol {
                insert_2.push(j);
            }
        }
        let nodes_added = insert_1.len() + 2 * insert_2.len();
        debug!(
            "sweep {sweep}: max rms residual {max_rms:.2e}, max bc residual {max_bc_res:.2e}, \
             {m} nodes, {nodes_added} to add"
        );

        if m + nodes_added > settings.max_nodes {
            status = BvpStatus::MaxNodesExceeded;
            break;
        }
        if nodes_added > 0 {
            if sweep >= settings.max_mesh_sweeps {
                status = BvpStatus::MaxNodesExceeded;
                break;
            }
            x = modify_mesh(&x, &insert_1, &insert_2);
            let pts: Vec<f64> = x.iter().cloned().collect();
            y = sol.eval_many(&pts);
        } else if max_bc_res <= settings.bc_tol {
            status = BvpStatus::Converged;
            break;
        } else {
            // the mesh already resolves the ODE but Newton cannot push the
            // boundary residual below bc_tol; refining would not help
            status = BvpStatus::BcToleranceNotMet;
            break;
        }
    }

    let m = x.len();
    let h = DVector::from_fn(m - 1, |j, _| x[j + 1] - x[j]);
    let (col_res, _, f, f_middle) = collocation_fun(&*wrapped, &y, &x, &h);
    let mut r_middle = DMatrix::zeros(n, m - 1);
    for j in 0..m - 1 {
        for i in 0..n {
            r_middle[(i, j)] = 1.5 * col_res[(i, j)] / h[j];
        }
    }
    let sol = CubicSpline::from_values_and_derivatives(&x, &y, &f);
    let rms_residuals = estimate_rms_residuals(&*wrapped, &sol, &x, &h, &r_middle, &f_middle);
    info!(
        "bvp solve finished after {sweep} sweeps with {m} nodes: {}",
        status.message()
    );

    Ok(BvpSolution {
        sol,
        x,
        y,
        yp: f,
        rms_residuals,
        niter: sweep,
        status,
    })
}
