//! Numerical machinery behind the soliton solve: a collocation BVP solver
//! with singular-term handling, its banded linear algebra, the cubic
//! interpolant it returns and the quadrature rules used by post-processing.

#[allow(non_snake_case)]
pub mod BVP_colloc;
pub mod band;
pub mod quadrature;
pub mod spline;
