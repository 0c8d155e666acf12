//! Townes soliton ground state of the stationary radial nonlinear
//! Schrodinger equation.
//!
//! The profile R(r) solves
//!
//!   R'' + (1/r) R' - 2 R + 2 R^3 = 0,   R'(0) = 0,   R(inf) = 0,
//!
//! posed as a first-order system on the truncated domain [0, r_max] with
//! the 1/r coefficient carried by a constant singular matrix. The pipeline
//! is a single batch run: solve the boundary value problem, integrate the
//! physical invariants, report them and persist the profile tables and
//! plots.
//!
//! - [`TownesEquation`] defines the system, its boundary residual and the
//!   singular matrix
//! - [`TownesSolver`] drives the collocation solve from the Gaussian guess
//! - [`TownesPostProcessor`] computes the invariants and owns the output
//!   surface

#[allow(non_snake_case)]
pub mod TownesEquation;
#[allow(non_snake_case)]
pub mod TownesPostProcessor;
#[allow(non_snake_case)]
pub mod TownesSolver;
pub mod soliton_bvp_utils;
mod soliton_bvp_tests;
