//! CSV ingest of sample points.
//!
//! The file needs an `x` and a `y` column (case-insensitive, any order). Rows
//! that fail to parse or hold non-finite values are skipped and reported, so one
//! bad line does not sink a whole dataset.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Point;
use crate::error::{FitError, Result};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Summary stats about the points actually loaded.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Ingest output: points + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub points: Vec<Point>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        let stats = compute_stats(&points)
            .ok_or_else(|| FitError::MissingPoints("no valid points".to_string()))?;
        let rows_read = points.len();
        Ok(Self {
            points,
            stats,
            row_errors: Vec::new(),
            rows_read,
        })
    }
}

/// Load points from a CSV file.
pub fn load_points(path: &Path) -> Result<IngestedData> {
    let file = File::open(path)
        .map_err(|e| FitError::io(format!("Failed to open CSV '{}'", path.display()), e))?;
    read_points(file)
}

/// Load points from any CSV reader.
pub fn read_points<R: Read>(source: R) -> Result<IngestedData> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| FitError::csv("Failed to read CSV headers", e))?
        .clone();
    let header_map = build_header_map(&headers);
    let (Some(&x_col), Some(&y_col)) = (header_map.get("x"), header_map.get("y")) else {
        return Err(FitError::InputValidation(
            "CSV must contain `x` and `y` columns".to_string(),
        ));
    };

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("unreadable row: {e}"),
                });
                continue;
            }
        };
        match parse_row(&record, x_col, y_col) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        log::warn!("skipped {} of {rows_read} CSV rows", row_errors.len());
    }

    let stats = compute_stats(&points).ok_or_else(|| {
        FitError::MissingPoints(format!("no valid points in {rows_read} CSV rows"))
    })?;

    Ok(IngestedData {
        points,
        stats,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn parse_row(record: &StringRecord, x_col: usize, y_col: usize) -> std::result::Result<Point, String> {
    let x = parse_f64(record, x_col, "x")?;
    let y = parse_f64(record, y_col, "y")?;
    Ok(Point::new(x, y))
}

fn parse_f64(record: &StringRecord, col: usize, name: &str) -> std::result::Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing `{name}`"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("`{name}` is not a number: '{raw}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("`{name}` is not finite: '{raw}'"))
    }
}

/// Write points as an `x,y` CSV.
pub fn write_points(path: &Path, points: &[Point]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| FitError::csv(format!("Failed to create CSV '{}'", path.display()), e))?;
    for p in points {
        writer
            .serialize(p)
            .map_err(|e| FitError::csv("Failed to write CSV row", e))?;
    }
    writer
        .flush()
        .map_err(|e| FitError::io(format!("Failed to flush CSV '{}'", path.display()), e))
}

fn compute_stats(points: &[Point]) -> Option<DatasetStats> {
    if points.is_empty() {
        return None;
    }
    let mut stats = DatasetStats {
        n_points: points.len(),
        x_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_min: f64::INFINITY,
        y_max: f64::NEG_INFINITY,
    };
    for p in points {
        stats.x_min = stats.x_min.min(p.x);
        stats.x_max = stats.x_max.max(p.x);
        stats.y_min = stats.y_min.min(p.y);
        stats.y_max = stats.y_max.max(p.y);
    }
    Some(stats)
}
