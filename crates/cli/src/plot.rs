//! SVG scatter plots of 2D datasets with their boundary and an optional classifier region.

use anyhow::{bail, Result};
use marginbench::{Dataset, Label, Point};
use nalgebra::Vector2;
use plotters::prelude::*;
use std::path::Path;

use crate::svc::Svc;

/// Cells per axis of the decision-region grid.
const REGION_CELLS: usize = 80;

/// Draw `dataset` inside `[-scale, scale]²`; shade `classifier`'s predicted regions if given.
pub fn plot_dataset(
    path: &Path,
    dataset: &Dataset,
    scale: f64,
    classifier: Option<&Svc>,
) -> Result<()> {
    if dataset.dim() != 2 {
        bail!("only 2D datasets can be plotted (got {}D)", dataset.dim());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let root = SVGBackend::new(path, (640, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} (n={})", dataset.family(), dataset.len()),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(-scale..scale, -scale..scale)?;
    chart.configure_mesh().draw()?;

    if let Some(svc) = classifier {
        let step = 2.0 * scale / REGION_CELLS as f64;
        let centers: Vec<Point> = (0..REGION_CELLS * REGION_CELLS)
            .map(|k| {
                let (i, j) = (k % REGION_CELLS, k / REGION_CELLS);
                Point::from_vec(vec![
                    -scale + (i as f64 + 0.5) * step,
                    -scale + (j as f64 + 0.5) * step,
                ])
            })
            .collect();
        let predicted = svc.predict(&centers)?;
        chart.draw_series(centers.iter().zip(&predicted).map(|(c, l)| {
            let half = 0.5 * step;
            Rectangle::new(
                [(c[0] - half, c[1] - half), (c[0] + half, c[1] + half)],
                label_color(*l).mix(0.15).filled(),
            )
        }))?;
    }

    chart.draw_series(
        dataset
            .iter()
            .map(|(p, l)| Circle::new((p[0], p[1]), 3, label_color(l).filled())),
    )?;

    if let Some(outline) = dataset.boundary.outline(scale) {
        for run in visible_runs(&outline, scale) {
            chart.draw_series(LineSeries::new(run, BLACK.stroke_width(2)))?;
        }
    }
    root.present()?;
    tracing::info!(path = %path.display(), "plot written");
    Ok(())
}

fn label_color(l: Label) -> RGBColor {
    match l {
        Label::Positive => RED,
        Label::Negative => BLUE,
    }
}

/// Split a polyline into the consecutive stretches that stay inside `[-scale, scale]²`.
fn visible_runs(outline: &[Vector2<f64>], scale: f64) -> Vec<Vec<(f64, f64)>> {
    let inside = |p: &Vector2<f64>| p.x.abs() <= scale && p.y.abs() <= scale;
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for p in outline {
        if inside(p) {
            current.push((p.x, p.y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|r| r.len() >= 2);
    runs
}
