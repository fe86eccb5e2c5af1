// src/report.rs
// Persistence and presentation of analysis results

use crate::analyzer::AnalysisResult;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_OUTPUT_PATH: &str = "risk_analysis.json";

pub const COLUMNS: [&str; 4] = [
    "context",
    "risks_analysis",
    "obligations_analysis",
    "recommendations",
];

const SECTION_RULE_WIDTH: usize = 80;
const ENTRY_RULE_WIDTH: usize = 300;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Write(#[source] io::Error),
}

/// Write results as a pretty-printed JSON array (4-space indent, UTF-8, no
/// ASCII escaping).
pub fn save_results<P: AsRef<Path>>(path: P, results: &[AnalysisResult]) -> Result<(), ReportError> {
    let path = path.as_ref();
    debug!(path = ?path, "Saving analysis results");

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    results.serialize(&mut serializer)?;

    std::fs::write(path, buf).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = ?path, records = results.len(), "Analysis results saved");

    Ok(())
}

pub fn load_results<P: AsRef<Path>>(path: P) -> Result<Vec<AnalysisResult>, ReportError> {
    let path = path.as_ref();
    debug!(path = ?path, "Loading analysis results");

    let json = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let results: Vec<AnalysisResult> = serde_json::from_str(&json)?;

    debug!(path = ?path, records = results.len(), "Analysis results loaded");
    Ok(results)
}

/// Human-readable report, one block per result
pub fn write_report<W: Write>(writer: &mut W, results: &[AnalysisResult]) -> Result<(), ReportError> {
    write_entries(writer, results).map_err(ReportError::Write)
}

fn write_entries<W: Write>(writer: &mut W, results: &[AnalysisResult]) -> io::Result<()> {
    let section_rule = "-".repeat(SECTION_RULE_WIDTH);
    let entry_rule = "=".repeat(ENTRY_RULE_WIDTH);

    for entry in results {
        let sections = [
            ("Context", &entry.context),
            ("Risks Analysis", &entry.risks_analysis),
            ("Obligations Analysis", &entry.obligations_analysis),
            ("Recommendations", &entry.recommendations),
        ];

        for (i, (label, value)) in sections.iter().enumerate() {
            writeln!(writer, "  # {}:\n", label)?;
            writeln!(writer, "     {}", value)?;
            if i + 1 < sections.len() {
                writeln!(writer, "\n{}", section_rule)?;
            }
        }
        writeln!(writer, "{}\n", entry_rule)?;
    }

    writer.flush()
}

/// Tabular view of a result set: one row per result, one column per field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTable {
    rows: Vec<[String; 4]>,
}

impl ResultTable {
    pub fn from_results(results: Vec<AnalysisResult>) -> Self {
        let rows = results
            .into_iter()
            .map(|r| {
                [
                    r.context,
                    r.risks_analysis,
                    r.obligations_analysis,
                    r.recommendations,
                ]
            })
            .collect();
        Self { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[String; 4]> {
        self.rows.get(index)
    }

    /// All values of the named column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = COLUMNS.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = COLUMNS.iter().position(|c| *c == column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }
}

const CELL_PREVIEW_CHARS: usize = 40;

fn preview(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > CELL_PREVIEW_CHARS {
        let cut: String = flat.chars().take(CELL_PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// Compact grid with truncated cells, similar to a data frame preview
impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        write!(f, "{:>width$}", "", width = index_width)?;
        for column in COLUMNS {
            write!(f, "  {:<width$}", column, width = CELL_PREVIEW_CHARS)?;
        }
        writeln!(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:>width$}", i, width = index_width)?;
            for cell in row {
                write!(f, "  {:<width$}", preview(cell), width = CELL_PREVIEW_CHARS)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
