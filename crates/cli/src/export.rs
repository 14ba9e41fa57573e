//! CSV writers (polars) for datasets, sweep results, and the per-case trials.

use anyhow::{Context, Result};
use marginbench::{Dataset, DecisionBoundary};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

use crate::svc::Confusion;

/// One point of a distance trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialRow {
    pub case: String,
    pub x: f64,
    pub y: f64,
    pub label: i8,
    pub distance: f64,
    pub signed_distance: f64,
    pub decision: f64,
}

/// Hold-out confusion counts of one trial case.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionRow {
    pub case: String,
    pub cm: Confusion,
}

/// Two numeric columns, e.g. `(n, average_errors)`.
pub fn write_pairs(path: &Path, x_name: &str, y_name: &str, rows: &[(usize, f64)]) -> Result<()> {
    let xs: Vec<u64> = rows.iter().map(|r| r.0 as u64).collect();
    let ys: Vec<f64> = rows.iter().map(|r| r.1).collect();
    let mut df = df!(x_name => xs, y_name => ys)?;
    write_csv(path, &mut df)
}

/// Coordinates `x0..x{d-1}`, the label, and the distance to the boundary.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let dim = dataset.dim();
    let mut columns: Vec<Series> = (0..dim)
        .map(|j| {
            let name = format!("x{j}");
            let values: Vec<f64> = dataset.points.iter().map(|p| p[j]).collect();
            Series::new(name.as_str().into(), values)
        })
        .collect();
    let labels: Vec<i32> = dataset.labels.iter().map(|l| i32::from(l.value())).collect();
    let distances: Vec<f64> = dataset
        .points
        .iter()
        .map(|p| dataset.boundary.distance(p))
        .collect();
    columns.push(Series::new("label".into(), labels));
    columns.push(Series::new("distance".into(), distances));
    let mut df = DataFrame::new(columns.into_iter().map(Into::into).collect())?;
    write_csv(path, &mut df)
}

pub fn write_trial(path: &Path, rows: &[TrialRow]) -> Result<()> {
    let case: Vec<&str> = rows.iter().map(|r| r.case.as_str()).collect();
    let x: Vec<f64> = rows.iter().map(|r| r.x).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.y).collect();
    let label: Vec<i32> = rows.iter().map(|r| i32::from(r.label)).collect();
    let distance: Vec<f64> = rows.iter().map(|r| r.distance).collect();
    let signed: Vec<f64> = rows.iter().map(|r| r.signed_distance).collect();
    let decision: Vec<f64> = rows.iter().map(|r| r.decision).collect();
    let mut df = df!(
        "case" => case,
        "x" => x,
        "y" => y,
        "label" => label,
        "boundary_distance" => distance,
        "signed_distance" => signed,
        "decision_value" => decision,
    )?;
    write_csv(path, &mut df)
}

/// One line per case: `case,tp,fp,tn,fn`.
pub fn write_confusion(path: &Path, rows: &[ConfusionRow]) -> Result<()> {
    let count = |f: fn(&Confusion) -> usize| -> Vec<u64> {
        rows.iter().map(|r| f(&r.cm) as u64).collect()
    };
    let case: Vec<&str> = rows.iter().map(|r| r.case.as_str()).collect();
    let mut df = df!(
        "case" => case,
        "tp" => count(|c| c.tp),
        "fp" => count(|c| c.fp),
        "tn" => count(|c| c.tn),
        "fn" => count(|c| c.fn_),
    )?;
    write_csv(path, &mut df)
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = df.height(), cols = df.width(), "csv written");
    Ok(())
}
