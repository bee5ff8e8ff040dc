//! PNG rendering of a [`PlotSuite`] with `plotters`.
//!
//! This module only draws; every number it shows comes from the payloads.
//! It also owns the output file names.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;

use crate::plots::{AxisRange, ComparisonPlot, ConvergencePlot, HeatmapPlot, PlotSuite, PrimeRacePlot};

pub const HEATMAP_FILE: &str = "heatmap_multiple_N.png";
pub const CREATIVE_FILE: &str = "creative_visualization.png";
pub const PAYLOAD_FILE: &str = "plots.json";

const SIZE: (u32, u32) = (1600, 1000);
const MISSING_CELL: RGBColor = RGBColor(211, 211, 211);

pub fn convergence_file(n: u64) -> String {
    format!("convergence_N{}.png", n)
}

pub fn comparison_file(n: u64) -> String {
    format!("comparison_N{}.png", n)
}

/// Errors that can occur while writing plots.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(e.to_string())
    }
}

/// Draw all six plots into `out_dir`, returning the written paths.
pub fn render_suite(suite: &PlotSuite, out_dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    for plot in &suite.convergence {
        let path = out_dir.join(convergence_file(plot.modulus));
        render_convergence(plot, &path)?;
        written.push(path);
    }

    let path = out_dir.join(comparison_file(suite.comparison.modulus));
    render_comparison(&suite.comparison, &path)?;
    written.push(path);

    let path = out_dir.join(HEATMAP_FILE);
    render_heatmap(&suite.heatmap, &path)?;
    written.push(path);

    let path = out_dir.join(CREATIVE_FILE);
    render_race(&suite.race, &path)?;
    written.push(path);

    for path in &written {
        info!("wrote {}", path.display());
    }
    Ok(written)
}

/// Dump the payloads as pretty JSON.
pub fn write_payloads(suite: &PlotSuite, path: &Path) -> Result<(), RenderError> {
    let json = serde_json::to_string_pretty(suite)?;
    fs::write(path, json)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Axis range as a drawable interval; plotters needs min < max.
fn span(range: AxisRange) -> Range<f64> {
    if range.max > range.min {
        range.min..range.max
    } else {
        (range.min - 0.5)..(range.min + 0.5)
    }
}

fn render_convergence(plot: &ConvergencePlot, path: &Path) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let x = span(plot.x_range);
    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x.clone(), span(plot.y_range))?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    for (i, series) in plot.series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        let points: Vec<(f64, f64)> = plot
            .bounds
            .iter()
            .zip(&series.values)
            .map(|(&b, &d)| (b as f64, d))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
    }

    let r = plot.reference.value;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x.start, r), (x.end, r)],
            BLACK.stroke_width(2),
        )))?
        .label(plot.reference.label.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn render_comparison(plot: &ComparisonPlot, path: &Path) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let k = plot.residues.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(k as f64 - 0.5), span(plot.y_range))?;

    let category = |v: &f64| {
        let i = v.round();
        if (v - i).abs() < 1e-6 && i >= 0.0 {
            plot.categories.get(i as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(k)
        .x_label_formatter(&category)
        .y_desc("Density")
        .draw()?;

    let half = 0.35;
    chart
        .draw_series(plot.empirical.iter().enumerate().map(|(i, &e)| {
            let mid = i as f64;
            Rectangle::new([(mid - half, 0.0), (mid, e)], BLUE.mix(0.6).filled())
        }))?
        .label("Empirical")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], BLUE.mix(0.6).filled()));
    chart
        .draw_series(plot.theoretical.iter().enumerate().map(|(i, &t)| {
            let mid = i as f64;
            Rectangle::new([(mid, 0.0), (mid + half, t)], RED.mix(0.6).filled())
        }))?
        .label("Theoretical")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], RED.mix(0.6).filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Blue (low) to red (high) over `range`.
fn heat_color(value: f64, range: AxisRange) -> HSLColor {
    let t = if range.max > range.min {
        ((value - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    HSLColor(0.66 * (1.0 - t), 0.75, 0.5)
}

fn render_heatmap(plot: &HeatmapPlot, path: &Path) -> Result<(), RenderError> {
    let rows = plot.moduli.len();
    let height = 400 + 30 * rows as u32;
    let root = BitMapBackend::new(path, (SIZE.0, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..plot.columns.len() as f64, 0.0..rows as f64)?;

    // Row 0 is drawn at the top.
    let row_label = |v: &f64| {
        let from_top = rows as f64 - v - 0.5;
        let i = from_top.round();
        if (from_top - i).abs() < 1e-6 && i >= 0.0 {
            plot.moduli
                .get(i as usize)
                .map(|n| format!("N={}", n))
                .unwrap_or_default()
        } else {
            String::new()
        }
    };
    let column_label = |v: &f64| {
        let c = v - 0.5;
        if (c - c.round()).abs() < 1e-6 && c >= 0.0 {
            format!("{}", c.round() as u64)
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Residue class")
        .x_labels(plot.columns.len() * 2 + 1)
        .y_labels(rows * 2 + 1)
        .x_label_formatter(&column_label)
        .y_label_formatter(&row_label)
        .draw()?;

    let cells = plot.cells.iter().enumerate().flat_map(|(i, row)| {
        let y = (rows - 1 - i) as f64;
        row.iter().enumerate().map(move |(r, cell)| (r as f64, y, *cell))
    });
    chart.draw_series(cells.clone().map(|(x, y, cell)| {
        let style = match cell {
            Some(v) => heat_color(v, plot.value_range).filled(),
            None => MISSING_CELL.filled(),
        };
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], style)
    }))?;
    chart.draw_series(cells.filter_map(|(x, y, cell)| {
        cell.map(|v| {
            Text::new(
                format!("{:.3}", v),
                (x + 0.15, y + 0.6),
                ("sans-serif", 16).into_font(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

fn render_race(plot: &PrimeRacePlot, path: &Path) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let x = span(plot.x_range);
    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x.clone(), span(plot.y_range))?;

    chart
        .configure_mesh()
        .x_desc("Prime upper limit")
        .y_desc(plot.y_label.as_str())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x.start, 0.0), (x.end, 0.0)],
        BLACK.mix(0.6),
    )))?;
    let color = RGBColor(0xd1, 0x49, 0x5b);
    chart.draw_series(LineSeries::new(
        plot.primes
            .iter()
            .zip(&plot.leads)
            .map(|(&p, &lead)| (p as f64, lead as f64)),
        color.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(convergence_file(3), "convergence_N3.png");
        assert_eq!(convergence_file(5), "convergence_N5.png");
        assert_eq!(comparison_file(12), "comparison_N12.png");
        assert_eq!(HEATMAP_FILE, "heatmap_multiple_N.png");
        assert_eq!(CREATIVE_FILE, "creative_visualization.png");
    }

    #[test]
    fn test_span_widens_degenerate_range() {
        assert_eq!(span(AxisRange { min: 2.0, max: 2.0 }), 1.5..2.5);
        assert_eq!(span(AxisRange { min: 0.0, max: 1.0 }), 0.0..1.0);
    }

    #[test]
    fn test_heat_color_endpoints() {
        let range = AxisRange { min: 0.0, max: 1.0 };
        assert_eq!(heat_color(0.0, range).0, 0.66);
        assert_eq!(heat_color(1.0, range).0, 0.0);
        assert_eq!(heat_color(5.0, range).0, 0.0);
    }
}
