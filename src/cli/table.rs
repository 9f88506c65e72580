//! Table formatting utilities for CLI list commands
//!
//! One row/column model shared by every list command, rendered as aligned
//! TSV (colored on a terminal), CSV, Markdown or bare ids.

use chrono::{DateTime, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_distance, format_pct, truncate_str};
use crate::cli::OutputFormat;
use crate::core::lifecycle::LifecycleTier;
use crate::entities::CarStatusClass;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id, e.g. `PART-12` (cyan)
    Id(String),
    /// Plain text, truncated to the column
    Text(String),
    /// Part type or other category
    Type(String),
    /// Lifecycle tier with color coding
    Tier(LifecycleTier),
    /// Lifecycle percentage, colored by its tier
    Percentage(Option<f64>),
    /// Distance in km
    Distance(Option<i64>),
    /// Installation state (yes=green, no=dim)
    Active(bool),
    /// Replacement flag (REPLACE=red bold)
    Replace(bool),
    /// Raw car status, colored by its class
    CarStatus(String),
    /// Date only
    Date(DateTime<Utc>),
    /// Optional date ("-" when absent)
    OptionalDate(Option<DateTime<Utc>>),
    /// Numeric value
    Number(i64),
    /// Empty/placeholder
    Empty,
}

fn tier_style(tier: LifecycleTier, text: String) -> console::StyledObject<String> {
    match tier {
        LifecycleTier::Good => style(text).green(),
        LifecycleTier::Warning => style(text).yellow(),
        LifecycleTier::Critical => style(text).red().bold(),
        LifecycleTier::Unknown => style(text).dim(),
    }
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) | CellValue::Type(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Tier(tier) => {
                format!("{:<width$}", tier_style(*tier, tier.label().to_string()), width = width)
            }
            CellValue::Percentage(pct) => {
                let tier = LifecycleTier::classify(*pct);
                format!("{:>width$}", tier_style(tier, format_pct(*pct)), width = width)
            }
            CellValue::Distance(km) => format!("{:>width$}", format_distance(*km), width = width),
            CellValue::Active(active) => {
                let styled = if *active {
                    style("yes").green()
                } else {
                    style("no").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Replace(replace) => {
                let styled = if *replace {
                    style("REPLACE").red().bold()
                } else {
                    style("-").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::CarStatus(status) => {
                let styled = match CarStatusClass::from_status(status) {
                    CarStatusClass::Operational => style(status).green(),
                    CarStatusClass::Service => style(status).yellow(),
                    CarStatusClass::Retired => style(status).dim(),
                    CarStatusClass::Other => style(status).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(_) | CellValue::OptionalDate(_) => {
                format!("{:<width$}", self.raw_or_dash(), width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) | CellValue::CarStatus(s) => {
                escape_csv(s)
            }
            other => other.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Replace(true) => "**REPLACE**".to_string(),
            CellValue::Tier(LifecycleTier::Critical) => "**Critical**".to_string(),
            other => other.raw_or_dash(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting, for ID and CSV output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) | CellValue::CarStatus(s) => {
                s.clone()
            }
            CellValue::Tier(tier) => tier.to_string(),
            CellValue::Percentage(pct) => pct.map(|p| format!("{:.1}", p)).unwrap_or_default(),
            CellValue::Distance(km) => km.map(|k| k.to_string()).unwrap_or_default(),
            CellValue::Active(b) | CellValue::Replace(b) => {
                if *b {
                    "yes".to_string()
                } else {
                    "no".to_string()
                }
            }
            CellValue::Date(dt) => dt.format("%Y-%m-%d").to_string(),
            CellValue::OptionalDate(dt) => dt.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Human-readable text without colors
    fn raw_or_dash(&self) -> String {
        match self {
            CellValue::Tier(tier) => tier.label().to_string(),
            CellValue::Percentage(pct) => format_pct(*pct),
            CellValue::Distance(km) => format_distance(*km),
            CellValue::Replace(false) => "-".to_string(),
            other => {
                let raw = other.raw();
                if raw.is_empty() {
                    "-".to_string()
                } else {
                    raw
                }
            }
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Active(_) => 3,
            CellValue::Replace(true) => 7,
            other => other.raw_or_dash().chars().count(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: String) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    record_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], record_name: &'static str) -> Self {
        Self {
            columns,
            record_name,
            show_summary: true,
        }
    }

    /// Omit the "N record(s) found" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat, visible_columns: &[&str])
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows, visible_columns),
            OutputFormat::Md => self.output_md(&rows, visible_columns),
            OutputFormat::Id => self.output_ids(&rows),
            _ => self.output_tsv(&rows, visible_columns),
        }
    }

    fn visible(&self, visible_columns: &[&str]) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| visible_columns.contains(&c.key))
            .collect()
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow], columns: &[&ColumnDef]) -> Vec<usize> {
        let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);
        let mut widths = vec![id_width];

        for col in columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            // +2 for the truncation buffer, capped at the column's width
            let natural = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural.min(col.width.max(col.header.len())));
        }

        widths
    }

    fn output_tsv(&self, rows: &[TableRow], visible_columns: &[&str]) {
        let columns = self.visible(visible_columns);
        let widths = self.calculate_widths(rows, &columns);

        let mut header_parts = vec![format!("{:<width$}", style("ID").bold(), width = widths[0])];
        for (col, width) in columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut parts = vec![format!("{:<width$}", style(&row.id).cyan(), width = widths[0])];
            for (col, width) in columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*width)),
                    None => parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.record_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow], visible_columns: &[&str]) {
        let columns = self.visible(visible_columns);

        let mut headers = vec!["id".to_string()];
        headers.extend(columns.iter().map(|c| c.key.to_string()));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![escape_csv(&row.id)];
            for col in &columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow], visible_columns: &[&str]) {
        let columns = self.visible(visible_columns);

        let mut headers = vec!["ID".to_string()];
        headers.extend(columns.iter().map(|c| c.header.to_string()));
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let mut values = vec![row.id.clone()];
            for col in &columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.id);
        }
    }
}

/// Convert a list of column enums to their keys
pub fn columns_to_keys<C: ColumnKey>(columns: &[C]) -> Vec<&'static str> {
    columns.iter().map(|c| c.key()).collect()
}

/// Column selector enums used by list commands
pub trait ColumnKey {
    fn key(&self) -> &'static str;
}
