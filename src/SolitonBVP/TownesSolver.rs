//! Driver for the Townes profile solve.
//!
//! Owns the task lifecycle: validated configuration in, converged
//! collocation solution out, invariants and persisted tables after
//! post-processing. The actual numerics live in `crate::numerical`.

use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use prettytable::{Table, row};
use thiserror::Error;

use super::TownesEquation;
use super::TownesPostProcessor::TownesInvariants;
use super::soliton_bvp_utils::TownesConfig;
use crate::numerical::BVP_colloc::{BvpError, BvpSettings, BvpSolution, solve_bvp};

/// Tail amplitude and slope above this level mean the truncated domain is
/// cutting into the profile.
const TRUNCATION_THRESHOLD: f64 = 1e-3;

#[derive(Debug, Error)]
pub enum SolitonError {
    #[error("BVP solve did not converge: {0}")]
    NotConverged(&'static str),
    #[error("BVP solver error: {0}")]
    Solver(#[from] BvpError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("norm integral is degenerate ({0:.3e}); the profile collapsed to zero")]
    DegenerateNorm(f64),
    #[error("missing data: {0}")]
    MissingData(&'static str),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("plot rendering failed: {0}")]
    Plot(String),
}

/// One Townes profile computation. Created from a configuration, filled in
/// by `solve()` and `postprocessing()`.
pub struct TownesTask {
    pub config: TownesConfig,
    pub solution: Option<BvpSolution>,
    pub invariants: Option<TownesInvariants>,
    /// dense samples (r, R) produced by post-processing, reused by the
    /// tables and plots
    pub r_grid: Vec<f64>,
    pub amplitude: Vec<f64>,
}

impl TownesTask {
    pub fn new(config: TownesConfig) -> Result<Self, SolitonError> {
        config.validate()?;
        Ok(Self {
            config,
            solution: None,
            invariants: None,
            r_grid: Vec::new(),
            amplitude: Vec::new(),
        })
    }

    /// Uniform grid of `grid_points` nodes on [0, r_max].
    pub fn grid(&self) -> DVector<f64> {
        let m = self.config.grid_points;
        let h = self.config.r_max / (m - 1) as f64;
        DVector::from_fn(m, |j, _| j as f64 * h)
    }

    /// Gaussian initial guess: R = sqrt(amplitude) * sqrt(2 pi) * phi(r)
    /// with phi the standard normal density, which collapses to
    /// sqrt(amplitude) * exp(-r^2 / 2); the slope row starts at zero.
    pub fn initial_guess(&self, r: &DVector<f64>) -> DMatrix<f64> {
        let a = self.config.guess_amplitude.sqrt();
        DMatrix::from_fn(2, r.len(), |i, j| {
            if i == 0 {
                a * (-0.5 * r[j] * r[j]).exp()
            } else {
                0.0
            }
        })
    }

    /// Run the collocation solve. Non-convergence is a hard error; a tight
    /// domain truncation is only warned about.
    pub fn solve(&mut self) -> Result<(), SolitonError> {
        let r = self.grid();
        let guess = self.initial_guess(&r);
        let settings = BvpSettings {
            tol: self.config.tol,
            bc_tol: self.config.tol,
            max_nodes: self.config.max_nodes,
            ..Default::default()
        };
        info!(
            "solving the Townes BVP on [0, {}] with {} nodes",
            self.config.r_max, self.config.grid_points
        );
        let solution = solve_bvp(
            &TownesEquation::rhs,
            &TownesEquation::boundary_residual,
            r,
            guess,
            Some(TownesEquation::singular_matrix()),
            &settings,
        )?;
        if !solution.success() {
            return Err(SolitonError::NotConverged(solution.status.message()));
        }
        info!(
            "converged after {} refinement sweeps, {} final nodes, max rms residual {:.2e}",
            solution.niter,
            solution.x.len(),
            solution.max_rms_residual()
        );
        self.solution = Some(solution);
        if !self.truncation_adequate()? {
            warn!(
                "profile tail at r_max = {} is above {:.0e}; the truncated domain \
                 may be cutting into the soliton, consider a larger r_max",
                self.config.r_max, TRUNCATION_THRESHOLD
            );
        }
        Ok(())
    }

    /// True when both |R(r_max)| and |R'(r_max)| have decayed below the
    /// truncation threshold.
    pub fn truncation_adequate(&self) -> Result<bool, SolitonError> {
        let solution = self
            .solution
            .as_ref()
            .ok_or(SolitonError::MissingData("solve() must run first"))?;
        let tail = solution.sol.eval(self.config.r_max);
        Ok(tail[0].abs() < TRUNCATION_THRESHOLD && tail[1].abs() < TRUNCATION_THRESHOLD)
    }

    /// Render the configuration and solver diagnostics to stderr. The
    /// stdout stream carries only the invariant report.
    pub fn pretty_print_task(&self) -> Result<(), SolitonError> {
        let mut table = Table::new();
        table.add_row(row!["grid points", self.config.grid_points]);
        table.add_row(row!["r_max", self.config.r_max]);
        table.add_row(row!["guess amplitude", self.config.guess_amplitude]);
        table.add_row(row!["tolerance", self.config.tol]);
        table.add_row(row!["max nodes", self.config.max_nodes]);
        if let Some(solution) = &self.solution {
            table.add_row(row!["status", solution.status.message()]);
            table.add_row(row!["refinement sweeps", solution.niter]);
            table.add_row(row!["final nodes", solution.x.len()]);
            table.add_row(row![
                "max rms residual",
                format!("{:.3e}", solution.max_rms_residual())
            ]);
        }
        table.print(&mut std::io::stderr())?;
        Ok(())
    }
}
