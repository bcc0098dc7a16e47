use std::fmt;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::prelude::{ROW_WIDTH, ReportError, ReportRow};

pub const REPORT_HEADERS: [&str; ROW_WIDTH] = [
    "Type",
    "Name",
    "Serial Number",
    "Description",
    "Site Name",
    "Site Latitude",
    "Site Longitude",
    "Parent Node",
];

/// Identity of the report as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ReportDescriptor {
    fn default() -> Self {
        ReportDescriptor {
            id: "TOPOLOGYINVENTORY".to_string(),
            name: "Network Topology Inventory Report".to_string(),
            version: "1.03".to_string(),
            description: "Sites, chassis, shelves, cards, ports, power supplies and fans"
                .to_string(),
        }
    }
}

impl ReportDescriptor {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportOutput {
    Tabular {
        headers: Vec<String>,
        rows: Vec<ReportRow>,
    },
    Textual {
        message: String,
    },
}

impl ReportOutput {
    /// A table of `rows` in the order given, or the no-data sentence when
    /// there are none.
    pub fn assemble(descriptor: &ReportDescriptor, rows: Vec<ReportRow>) -> Self {
        if rows.is_empty() {
            ReportOutput::Textual {
                message: format!("There is no data for report {}", descriptor.name),
            }
        } else {
            ReportOutput::Tabular {
                headers: REPORT_HEADERS.iter().map(|h| h.to_string()).collect(),
                rows,
            }
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, ReportOutput::Tabular { .. })
    }

    pub fn rows(&self) -> &[ReportRow] {
        match self {
            ReportOutput::Tabular { rows, .. } => rows,
            ReportOutput::Textual { .. } => &[],
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, ReportError> {
        Ok(match format {
            OutputFormat::Table => self.to_string(),
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}

impl fmt::Display for ReportOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportOutput::Textual { message } => writeln!(f, "{message}"),
            ReportOutput::Tabular { headers, rows } => {
                let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
                for row in rows {
                    for (width, cell) in widths.iter_mut().zip(row.fields()) {
                        *width = (*width).max(cell.chars().count());
                    }
                }

                let header = headers
                    .iter()
                    .zip(&widths)
                    .map(|(h, &w)| format!("{h:<w$}").bold().to_string())
                    .collect::<Vec<_>>()
                    .join("  ");
                writeln!(f, "{}", header.trim_end())?;

                let rule = widths
                    .iter()
                    .map(|&w| "-".repeat(w))
                    .collect::<Vec<_>>()
                    .join("  ");
                writeln!(f, "{}", rule.dimmed())?;

                for row in rows {
                    let line = row
                        .fields()
                        .iter()
                        .zip(&widths)
                        .map(|(cell, &w)| format!("{cell:<w$}"))
                        .collect::<Vec<_>>()
                        .join("  ");
                    writeln!(f, "{}", line.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Counters logged after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub rows: usize,
    pub orphans: usize,
    pub unresolved_references: usize,
}
