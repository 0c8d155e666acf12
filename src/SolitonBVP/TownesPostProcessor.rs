//! Quadrature post-processing of the converged profile and the output
//! surface of the pipeline.
//!
//! The profile is re-sampled densely on the configured grid; all integrals
//! use the same composite Simpson rule on that grid, the radial derivative
//! comes from central finite differences. The six scalars are printed to
//! stdout (one per line, in this fixed order) before any file is touched,
//! so the report survives an I/O failure in the table or plot stage.

use std::path::Path;

use log::info;

use super::TownesSolver::{SolitonError, TownesTask};
use crate::Utils::logger::save_pairs_to_csv;
use crate::Utils::plots::plot_profile;
use crate::numerical::quadrature::{gradient_uniform, simpson_uniform};

const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Norm below this is numerically a zero profile; the width would divide
/// by it.
const NORM_FLOOR: f64 = 1e-12;

/// Physical invariants of the profile, all radial integrals weighted by
/// the 2 pi r area element unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct TownesInvariants {
    /// I = integral of R^2 r 2pi dr, the L2 norm (critical power)
    pub norm: f64,
    /// gamma = integral of (dR/dr)^2 r 2pi dr
    pub gradient_energy: f64,
    /// alpha^2 = integral of R^2 r^3 2pi dr, the second radial moment
    pub second_moment: f64,
    /// beta = integral of R^4 r 2pi dr, the quartic (self-focusing) term
    pub quartic: f64,
    /// w = sqrt(integral of R^2 r^2 2pi dr / I)
    pub width: f64,
    /// peak amplitude R(0) of the sampled profile
    pub max_amplitude: f64,
}

impl TownesTask {
    /// Sample the solution densely and integrate the invariants.
    pub fn postprocessing(&mut self) -> Result<(), SolitonError> {
        let solution = self
            .solution
            .as_ref()
            .ok_or(SolitonError::MissingData("solve() must run before postprocessing"))?;
        let m = self.config.grid_points;
        let h = self.config.r_max / (m - 1) as f64;
        let r: Vec<f64> = (0..m).map(|j| j as f64 * h).collect();
        let amp: Vec<f64> = r.iter().map(|&ri| solution.sol.eval(ri)[0]).collect();

        let dens: Vec<f64> = amp.iter().map(|a| a * a).collect();
        let quart: Vec<f64> = dens.iter().map(|d| d * d).collect();
        let grad = gradient_uniform(&amp, h);

        let weighted =
            |f: &dyn Fn(usize) -> f64| -> f64 {
                let samples: Vec<f64> = (0..m).map(f).collect();
                simpson_uniform(&samples, h)
            };
        let norm = weighted(&|j| dens[j] * r[j] * TWO_PI);
        if norm < NORM_FLOOR {
            return Err(SolitonError::DegenerateNorm(norm));
        }
        let gradient_energy = weighted(&|j| grad[j] * grad[j] * r[j] * TWO_PI);
        let second_moment = weighted(&|j| dens[j] * r[j] * r[j] * r[j] * TWO_PI);
        let quartic = weighted(&|j| quart[j] * r[j] * TWO_PI);
        let width = (weighted(&|j| dens[j] * r[j] * r[j] * TWO_PI) / norm).sqrt();
        let max_amplitude = amp.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        info!(
            "invariants: I = {norm:.6}, gamma = {gradient_energy:.6}, \
             alpha^2 = {second_moment:.6}, beta = {quartic:.6}, w = {width:.6}, \
             max R = {max_amplitude:.6}"
        );
        self.invariants = Some(TownesInvariants {
            norm,
            gradient_energy,
            second_moment,
            quartic,
            width,
            max_amplitude,
        });
        self.r_grid = r;
        self.amplitude = amp;
        Ok(())
    }

    /// The authoritative report: six scalars on stdout, one per line.
    pub fn report(&self) -> Result<(), SolitonError> {
        let inv = self
            .invariants
            .as_ref()
            .ok_or(SolitonError::MissingData("postprocessing() must run before report()"))?;
        println!("{}", inv.norm);
        println!("{}", inv.gradient_energy);
        println!("{}", inv.second_moment);
        println!("{}", inv.quartic);
        println!("{}", inv.width);
        println!("{}", inv.max_amplitude);
        Ok(())
    }

    /// Normalized profile columns: r scaled to [0, 1], R scaled so the
    /// peak is exactly 1.
    pub fn normalized_profile(&self) -> Result<(Vec<f64>, Vec<f64>), SolitonError> {
        let inv = self
            .invariants
            .as_ref()
            .ok_or(SolitonError::MissingData("postprocessing() must run first"))?;
        let r_max = self.config.r_max;
        let r_norm = self.r_grid.iter().map(|&x| x / r_max).collect();
        let amp_norm = self
            .amplitude
            .iter()
            .map(|&a| a / inv.max_amplitude)
            .collect();
        Ok((r_norm, amp_norm))
    }

    /// Persist the three tables: (r, R), the normalized pair and the
    /// density (r, R^2). Comma-delimited, no header, one row per sample.
    pub fn save_to_csv(&self, dir: &Path) -> Result<(), SolitonError> {
        if self.amplitude.is_empty() {
            return Err(SolitonError::MissingData("postprocessing() must run before save_to_csv()"));
        }
        save_pairs_to_csv(&dir.join("townesprofile.csv"), &self.r_grid, &self.amplitude)?;
        let (r_norm, amp_norm) = self.normalized_profile()?;
        save_pairs_to_csv(&dir.join("townesprofile_normalized.csv"), &r_norm, &amp_norm)?;
        let dens: Vec<f64> = self.amplitude.iter().map(|a| a * a).collect();
        save_pairs_to_csv(&dir.join("townes_density.csv"), &self.r_grid, &dens)?;
        info!("profile tables written to {}", dir.display());
        Ok(())
    }

    /// Render the amplitude and density plots as PNG files, x-axis clipped
    /// to [0, r_max].
    pub fn plot(&self, dir: &Path) -> Result<(), SolitonError> {
        if self.amplitude.is_empty() {
            return Err(SolitonError::MissingData("postprocessing() must run before plot()"));
        }
        plot_profile(
            &dir.join("townes_amplitude.png"),
            "Townes soliton amplitude",
            "R(r)",
            &self.r_grid,
            &self.amplitude,
        )
        .map_err(SolitonError::Plot)?;
        let dens: Vec<f64> = self.amplitude.iter().map(|a| a * a).collect();
        plot_profile(
            &dir.join("townes_density.png"),
            "Townes soliton density",
            "|R(r)|^2",
            &self.r_grid,
            &dens,
        )
        .map_err(SolitonError::Plot)?;
        info!("plots written to {}", dir.display());
        Ok(())
    }
}
