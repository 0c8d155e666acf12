//! Configuration layer for the Townes solve.

use serde::{Deserialize, Serialize};

use super::TownesSolver::SolitonError;

/// All knobs of a profile computation. The defaults reproduce the
/// reference run: 10000 grid points on [0, 10] from the Gaussian guess of
/// squared amplitude 1.8625.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownesConfig {
    /// uniform grid size, also the dense post-processing resolution
    pub grid_points: usize,
    /// truncation radius standing in for infinity
    pub r_max: f64,
    /// squared amplitude of the Gaussian initial guess
    pub guess_amplitude: f64,
    /// collocation residual tolerance
    pub tol: f64,
    /// mesh refinement budget
    pub max_nodes: usize,
}

impl Default for TownesConfig {
    fn default() -> Self {
        Self {
            grid_points: 10000,
            r_max: 10.0,
            guess_amplitude: 1.8625,
            tol: 1e-6,
            max_nodes: 100_000,
        }
    }
}

impl TownesConfig {
    pub fn validate(&self) -> Result<(), SolitonError> {
        if self.grid_points < 3 {
            return Err(SolitonError::InvalidConfiguration(format!(
                "grid_points = {} but the collocation mesh needs at least 3 nodes",
                self.grid_points
            )));
        }
        if !self.r_max.is_finite() || self.r_max <= 0.0 {
            return Err(SolitonError::InvalidConfiguration(format!(
                "r_max = {} must be positive and finite",
                self.r_max
            )));
        }
        if !self.guess_amplitude.is_finite() || self.guess_amplitude <= 0.0 {
            return Err(SolitonError::InvalidConfiguration(format!(
                "guess_amplitude = {} must be positive and finite",
                self.guess_amplitude
            )));
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(SolitonError::InvalidConfiguration(format!(
                "tol = {} must be positive and finite",
                self.tol
            )));
        }
        if self.max_nodes < self.grid_points {
            return Err(SolitonError::InvalidConfiguration(format!(
                "max_nodes = {} is below the initial grid of {} points",
                self.max_nodes, self.grid_points
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SolitonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SolitonError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TownesConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = TownesConfig::default();
        config.grid_points = 2;
        assert!(config.validate().is_err());

        let mut config = TownesConfig::default();
        config.r_max = -1.0;
        assert!(config.validate().is_err());

        let mut config = TownesConfig::default();
        config.tol = 0.0;
        assert!(config.validate().is_err());

        let mut config = TownesConfig::default();
        config.max_nodes = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = TownesConfig {
            grid_points: 500,
            r_max: 8.0,
            guess_amplitude: 2.0,
            tol: 1e-5,
            max_nodes: 5000,
        };
        let json = config.to_json().unwrap();
        let back = TownesConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn from_json_validates() {
        let json = r#"{"grid_points":2,"r_max":10.0,"guess_amplitude":1.8625,"tol":1e-6,"max_nodes":100000}"#;
        assert!(TownesConfig::from_json(json).is_err());
    }
}
