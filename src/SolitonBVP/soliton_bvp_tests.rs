//! End-to-end checks of the Townes pipeline: solve, invariants, output
//! files. The physical targets are the known Townes constants for this
//! coefficient form, I = 5.8504 and R(0) = 2.2062, plus the virial
//! identities beta = 2 I and gamma = 2 I that the ground state satisfies
//! exactly.

#[cfg(test)]
mod tests {
    use std::fs;

    use approx::assert_relative_eq;

    use crate::SolitonBVP::TownesSolver::{SolitonError, TownesTask};
    use crate::SolitonBVP::soliton_bvp_utils::TownesConfig;
    use crate::numerical::quadrature::simpson_uniform;

    fn small_config(grid_points: usize) -> TownesConfig {
        TownesConfig {
            grid_points,
            r_max: 10.0,
            tol: 1e-6,
            ..Default::default()
        }
    }

    fn solved_task(config: TownesConfig) -> TownesTask {
        let mut task = TownesTask::new(config).unwrap();
        task.solve().unwrap();
        task.postprocessing().unwrap();
        task
    }

    #[test]
    fn profile_is_positive_monotone_and_decaying() {
        let task = solved_task(small_config(600));
        let amp = &task.amplitude;
        assert!(amp[0] > 2.0);
        for (j, &a) in amp.iter().enumerate() {
            assert!(a > -1e-6, "negative amplitude {a} at sample {j}");
        }
        for j in 0..amp.len() - 1 {
            assert!(
                amp[j + 1] <= amp[j] + 1e-8,
                "profile increases between samples {j} and {}",
                j + 1
            );
        }
        // smoothness at the origin and decay at the far end
        let solution = task.solution.as_ref().unwrap();
        assert!(solution.y[(1, 0)].abs() < 1e-6);
        assert!(amp.last().unwrap().abs() < 1e-6);
        assert!(task.truncation_adequate().unwrap());
    }

    #[test]
    fn invariants_match_the_townes_constants() {
        let task = solved_task(small_config(2000));
        let inv = task.invariants.as_ref().unwrap();
        assert_relative_eq!(inv.norm, 5.8504, max_relative = 1e-2);
        assert_relative_eq!(inv.max_amplitude, 2.2062, max_relative = 1e-2);
        // virial identities of the ground state
        assert_relative_eq!(inv.quartic, 2.0 * inv.norm, max_relative = 1e-2);
        assert_relative_eq!(inv.gradient_energy, 2.0 * inv.norm, max_relative = 1e-2);
        assert!(inv.width > 0.0 && inv.width.is_finite());
    }

    #[test]
    fn reference_resolution_run() {
        // the full-size scenario: 10000 points on [0, 10]
        let task = solved_task(TownesConfig::default());
        let inv = task.invariants.as_ref().unwrap();
        assert!(inv.norm > 5.8 && inv.norm < 5.9, "I = {}", inv.norm);
        assert!(
            inv.max_amplitude > 2.19 && inv.max_amplitude < 2.22,
            "max R = {}",
            inv.max_amplitude
        );
    }

    #[test]
    fn repeated_solves_are_identical() {
        let a = solved_task(small_config(500));
        let b = solved_task(small_config(500));
        assert_eq!(a.invariants, b.invariants);
    }

    #[test]
    fn invariants_are_grid_independent() {
        let coarse = solved_task(small_config(800));
        let fine = solved_task(small_config(1600));
        let ci = coarse.invariants.as_ref().unwrap();
        let fi = fine.invariants.as_ref().unwrap();
        assert_relative_eq!(ci.norm, fi.norm, max_relative = 1e-3);
        assert_relative_eq!(ci.gradient_energy, fi.gradient_energy, max_relative = 1e-3);
        assert_relative_eq!(ci.second_moment, fi.second_moment, max_relative = 1e-3);
        assert_relative_eq!(ci.quartic, fi.quartic, max_relative = 1e-3);
        assert_relative_eq!(ci.width, fi.width, max_relative = 1e-3);
    }

    #[test]
    fn width_recomputes_from_the_samples() {
        let task = solved_task(small_config(1000));
        let inv = task.invariants.as_ref().unwrap();
        let h = task.config.r_max / (task.config.grid_points - 1) as f64;
        let two_pi = 2.0 * std::f64::consts::PI;
        let weighted: Vec<f64> = task
            .r_grid
            .iter()
            .zip(&task.amplitude)
            .map(|(&r, &a)| a * a * r * r * two_pi)
            .collect();
        let width = (simpson_uniform(&weighted, h) / inv.norm).sqrt();
        assert_relative_eq!(width, inv.width, max_relative = 1e-12);
    }

    #[test]
    fn csv_tables_have_the_documented_shape() {
        let task = solved_task(small_config(400));
        let dir = tempfile::tempdir().unwrap();
        task.save_to_csv(dir.path()).unwrap();

        let profile = fs::read_to_string(dir.path().join("townesprofile.csv")).unwrap();
        assert_eq!(profile.lines().count(), 400);

        let normalized =
            fs::read_to_string(dir.path().join("townesprofile_normalized.csv")).unwrap();
        let rows: Vec<(f64, f64)> = normalized
            .lines()
            .map(|line| {
                let (x, y) = line.split_once(',').unwrap();
                (x.parse().unwrap(), y.parse().unwrap())
            })
            .collect();
        assert_eq!(rows.len(), 400);
        let max_x = rows.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = rows.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(max_x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(max_y, 1.0, epsilon = 1e-12);

        let density = fs::read_to_string(dir.path().join("townes_density.csv")).unwrap();
        let first = density.lines().next().unwrap();
        let (_, d0) = first.split_once(',').unwrap();
        let d0: f64 = d0.parse().unwrap();
        let inv = task.invariants.as_ref().unwrap();
        assert_relative_eq!(d0, inv.max_amplitude * inv.max_amplitude, max_relative = 1e-12);
    }

    #[test]
    fn plots_are_rendered_as_png() {
        let task = solved_task(small_config(300));
        let dir = tempfile::tempdir().unwrap();
        task.plot(dir.path()).unwrap();
        for name in ["townes_amplitude.png", "townes_density.png"] {
            let meta = fs::metadata(dir.path().join(name)).unwrap();
            assert!(meta.len() > 0, "{name} is empty");
        }
    }

    #[test]
    fn tight_truncation_is_caught() {
        // r_max = 1 cuts deep into the soliton core
        let config = TownesConfig {
            grid_points: 300,
            r_max: 1.0,
            tol: 1e-6,
            ..Default::default()
        };
        let mut task = TownesTask::new(config).unwrap();
        match task.solve() {
            Ok(()) => assert!(!task.truncation_adequate().unwrap()),
            Err(SolitonError::NotConverged(_)) | Err(SolitonError::Solver(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pipeline_stages_enforce_their_order() {
        let mut task = TownesTask::new(small_config(300)).unwrap();
        assert!(matches!(
            task.postprocessing(),
            Err(SolitonError::MissingData(_))
        ));
        assert!(matches!(task.report(), Err(SolitonError::MissingData(_))));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            task.save_to_csv(dir.path()),
            Err(SolitonError::MissingData(_))
        ));
    }
}
