//! Flat delimited-text persistence.
//!
//! The tables this crate emits are headerless two-column CSVs, one sample
//! per row, values in Rust's default float formatting. Non-finite values
//! are refused up front so a NaN never lands silently in a file that
//! downstream tooling will parse.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write paired columns to `path` as `x,y` lines without a header.
pub fn save_pairs_to_csv(path: &Path, xs: &[f64], ys: &[f64]) -> Result<(), io::Error> {
    if xs.len() != ys.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "column length mismatch: {} x values vs {} y values",
                xs.len(),
                ys.len()
            ),
        ));
    }
    if let Some(i) = (0..xs.len()).find(|&i| !xs[i].is_finite() || !ys[i].is_finite()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("non-finite value at row {i}: ({}, {})", xs[i], ys[i]),
        ));
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (x, y) in xs.iter().zip(ys) {
        writeln!(writer, "{},{}", x, y)?;
    }
    writer.flush()?;
    Ok(())
}
