//! Output helpers: flat-text persistence and headless plot rendering.

pub mod logger;
pub mod plots;
