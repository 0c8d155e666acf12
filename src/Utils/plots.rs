//! Headless PNG rendering of profile curves with plotters.

use plotters::prelude::*;
use std::path::Path;

/// Plot `ys` against `xs` as a single line, x-axis clipped to
/// [0, max x]. Errors are stringified because the backend error type is
/// generic over the drawing surface.
pub fn plot_profile(
    path: &Path,
    title: &str,
    y_label: &str,
    xs: &[f64],
    ys: &[f64],
) -> Result<(), String> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(format!(
            "cannot plot {} x values against {} y values",
            xs.len(),
            ys.len()
        ));
    }
    let x_max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let y_min = ys.iter().cloned().fold(f64::INFINITY, f64::min).min(0.0);
    let y_max = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !(x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return Err("non-finite values in plot data".to_string());
    }
    let y_span = (y_max - y_min).max(f64::EPSILON);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..(y_max + 0.05 * y_span))
        .map_err(|e| e.to_string())?;
    chart
        .configure_mesh()
        .x_desc("r")
        .y_desc(y_label)
        .draw()
        .map_err(|e| e.to_string())?;
    chart
        .draw_series(LineSeries::new(
            xs.iter().cloned().zip(ys.iter().cloned()),
            &BLUE,
        ))
        .map_err(|e| e.to_string())?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.png");
        let xs: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
        let ys: Vec<f64> = xs.iter().map(|x| (-x).exp()).collect();
        plot_profile(&path, "decay", "y", &xs, &ys).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
    }

    #[test]
    fn rejects_mismatched_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        assert!(plot_profile(&path, "bad", "y", &[0.0, 1.0], &[1.0]).is_err());
    }
}
