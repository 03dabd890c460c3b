//! Table region detection from text alignment.
//!
//! A table region is a run of consecutive rows whose runs start at shared,
//! column-aligned x positions. Only the number and extent of regions matter
//! here; cell content is not reconstructed.

use std::collections::{HashMap, HashSet};

use super::content::TextRun;

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping runs into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// A detected table region in native space.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegion {
    /// `[x0, y0, x1, y1]`
    pub bbox: [f32; 4],
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone)]
struct Row<'a> {
    y: f32,
    runs: Vec<&'a TextRun>,
}

/// Finds table-like regions among a page's text runs.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, runs: &[TextRun]) -> Vec<TableRegion> {
        if runs.len() < self.config.min_rows * self.config.min_columns {
            log::debug!("TableDetector: not enough runs ({})", runs.len());
            return Vec::new();
        }

        let rows = self.group_into_rows(runs);
        if rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} rows, columns at {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return Vec::new();
        }

        let mut regions = Vec::new();
        let mut start: Option<usize> = None;
        for i in 0..=rows.len() {
            let aligned = rows
                .get(i)
                .map(|row| self.aligned_columns(row, &columns) >= self.config.min_columns)
                .unwrap_or(false);
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if let Some(region) = self.region(&rows[s..i]) {
                        regions.push(region);
                    }
                    start = None;
                }
                _ => {}
            }
        }

        log::debug!("TableDetector: found {} table regions", regions.len());
        regions
    }

    /// Group runs into rows by baseline, top of the page first.
    fn group_into_rows<'a>(&self, runs: &'a [TextRun]) -> Vec<Row<'a>> {
        let mut sorted: Vec<&TextRun> = runs.iter().collect();
        sorted.sort_by(|a, b| {
            b.start
                .1
                .partial_cmp(&a.start.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.start
                        .0
                        .partial_cmp(&b.start.0)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut rows: Vec<Row> = Vec::new();
        for run in sorted {
            let tolerance = run.font_size * self.config.y_tolerance_factor;
            match rows.last_mut() {
                Some(row) if (run.start.1 - row.y).abs() <= tolerance => row.runs.push(run),
                _ => rows.push(Row {
                    y: run.start.1,
                    runs: vec![run],
                }),
            }
        }
        rows
    }

    /// Left edges shared by enough multi-run rows, sorted, at least
    /// `min_column_gap` apart.
    fn detect_columns(&self, rows: &[Row]) -> Vec<f32> {
        let multi_run_rows: Vec<&Row> = rows.iter().filter(|r| r.runs.len() >= 2).collect();
        if multi_run_rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let bucket_size = 5.0;
        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &multi_run_rows {
            let buckets: HashSet<i32> = row
                .runs
                .iter()
                .map(|r| (r.start.0 / bucket_size).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((multi_run_rows.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);
        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * bucket_size)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut columns: Vec<f32> = Vec::new();
        for edge in edges {
            match columns.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => columns.push(edge),
            }
        }
        columns
    }

    fn aligned_columns(&self, row: &Row, columns: &[f32]) -> usize {
        columns
            .iter()
            .filter(|col| row.runs.iter().any(|r| (r.start.0 - **col).abs() <= 5.0))
            .count()
    }

    fn region(&self, rows: &[Row]) -> Option<TableRegion> {
        if rows.len() < self.config.min_rows {
            return None;
        }
        let columns = self.detect_columns(rows).len();
        if columns < self.config.min_columns || columns > self.config.max_columns {
            log::debug!("TableDetector: skipping region with {} columns", columns);
            return None;
        }
        let bbox = rows
            .iter()
            .flat_map(|r| r.runs.iter())
            .map(|r| r.bbox())
            .reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])?;
        Some(TableRegion {
            bbox,
            rows: rows.len(),
            columns,
        })
    }
}
