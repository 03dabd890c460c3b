//! Line and block grouping.
//!
//! Text runs are grouped into lines by baseline, and consecutive lines into
//! blocks (paragraph-like regions) by spacing, font size and indentation.
//! Works in native PDF space, where y grows upward.

use std::cmp::Ordering;

use super::content::TextRun;

/// Baseline tolerance as a fraction of the font size.
const LINE_Y_TOLERANCE: f32 = 0.3;

/// Line spacing above this multiple of the average starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.5;

/// Font size change (points) that starts a new block.
const FONT_SIZE_BREAK: f32 = 1.0;

/// Indentation change (points) that starts a new block.
const INDENT_BREAK: f32 = 20.0;

/// Runs sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Sorted by x
    pub runs: Vec<TextRun>,
    /// Baseline y
    pub y: f32,
    /// Leftmost x
    pub x: f32,
    /// Dominant font size, weighted by text length
    pub font_size: f32,
}

impl TextLine {
    pub fn from_runs(mut runs: Vec<TextRun>) -> Self {
        runs.sort_by(|a, b| a.start.0.partial_cmp(&b.start.0).unwrap_or(Ordering::Equal));

        let total_chars: usize = runs.iter().map(|r| r.text.len()).sum();
        let weighted: f32 = runs
            .iter()
            .map(|r| r.font_size * r.text.len() as f32)
            .sum();
        let font_size = match (total_chars, runs.first()) {
            (0, Some(first)) => first.font_size,
            (0, None) => 0.0,
            (n, _) => weighted / n as f32,
        };
        let (x, y) = runs.first().map(|r| r.start).unwrap_or((0.0, 0.0));

        Self {
            runs,
            y,
            x,
            font_size,
        }
    }

    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `[x0, y0, x1, y1]` in native space.
    pub fn bbox(&self) -> Option<[f32; 4]> {
        self.runs.iter().map(TextRun::bbox).reduce(union)
    }
}

/// Consecutive lines forming one region.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// `[x0, y0, x1, y1]` in native space.
    pub fn bbox(&self) -> Option<[f32; 4]> {
        self.lines.iter().filter_map(TextLine::bbox).reduce(union)
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Group runs into lines, top of the page first.
pub fn group_into_lines(mut runs: Vec<TextRun>) -> Vec<TextLine> {
    runs.sort_by(|a, b| {
        let y_cmp = b.start.1.partial_cmp(&a.start.1).unwrap_or(Ordering::Equal);
        if y_cmp == Ordering::Equal {
            a.start.0.partial_cmp(&b.start.0).unwrap_or(Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut current_y: Option<f32> = None;

    for run in runs {
        let tolerance = run.font_size * LINE_Y_TOLERANCE;
        match current_y {
            Some(y) if (run.start.1 - y).abs() <= tolerance => current.push(run),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_runs(std::mem::take(&mut current)));
                }
                current_y = Some(run.start.1);
                current.push(run);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_runs(current));
    }
    lines
}

/// Group lines into blocks.
pub fn group_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break(prev, &line, avg_spacing) {
                blocks.push(TextBlock {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }
    blocks
}

/// Page text: lines top to bottom, separated by newlines.
pub fn page_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    (prev.y - curr.y).abs() > avg_spacing * BLOCK_GAP_FACTOR
        || (prev.font_size - curr.font_size).abs() > FONT_SIZE_BREAK
        || (prev.x - curr.x).abs() > INDENT_BREAK
}

fn union(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
}
