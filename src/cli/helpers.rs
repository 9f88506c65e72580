//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ValueEnum;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::{load_snapshot, SkippedFile};
use crate::core::query::{Page, PageRequest};
use crate::core::{Config, Project, Snapshot};

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Lifecycle percentage with one decimal, "-" when absent
pub fn format_pct(pct: Option<f64>) -> String {
    pct.map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "-".to_string())
}

/// Distance in km, "-" when absent
pub fn format_distance(km: Option<i64>) -> String {
    km.map(|k| format!("{} km", k))
        .unwrap_or_else(|| "-".to_string())
}

/// Everything a read command needs: project, layered config, loaded snapshot
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedFile>,
}

impl Workspace {
    /// Discover the project (or use `--project`) and load its snapshot
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load_for(&project);
        let data_dir = project.data_dir(config.data_dir.as_deref());
        tracing::debug!(data_dir = %data_dir.display(), "loading snapshot");

        let loaded = load_snapshot(&data_dir)?;
        if !loaded.skipped.is_empty() && !global.quiet {
            eprintln!(
                "{} {} file(s) skipped; run {} for details",
                style("!").yellow(),
                loaded.skipped.len(),
                style("pitlane validate").yellow()
            );
        }

        Ok(Self {
            project,
            config,
            snapshot: loaded.snapshot,
            skipped: loaded.skipped,
        })
    }

    /// Resolve `auto` against the configured default, then the command's own default
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        resolve_format(global.format, self.config.default_format.as_deref(), fallback)
    }

    /// Page request from CLI flags, defaulting the size from config
    pub fn page_request(&self, args: &PageArgs) -> Result<PageRequest> {
        if args.all {
            return Ok(PageRequest::all());
        }
        let size = args.page_size.unwrap_or_else(|| self.config.page_size());
        PageRequest::new(args.page, size).map_err(|e| miette::miette!("{}", e))
    }
}

/// Resolve the effective output format
pub fn resolve_format(
    requested: OutputFormat,
    configured: Option<&str>,
    fallback: OutputFormat,
) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    match configured.map(|s| OutputFormat::from_str(s, true)) {
        Some(Ok(format)) if format != OutputFormat::Auto => format,
        Some(Err(_)) => {
            tracing::warn!(value = ?configured, "ignoring unknown default_format");
            fallback
        }
        _ => fallback,
    }
}

/// Pagination flags shared by list commands
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (starting at 1)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Results per page (default: config page_size, or 100)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show every result on one page
    #[arg(long, conflicts_with_all = ["page", "page_size"])]
    pub all: bool,
}

/// Print a serializable value as JSON or YAML
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    use miette::IntoDiagnostic;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        _ => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
    }
    Ok(())
}

/// Footer describing the page shown, when there is more than one
pub fn print_page_footer<T>(page: &Page<T>) {
    if page.next.is_none() && page.previous.is_none() {
        return;
    }
    let mut line = format!("page {} ({} result(s) total)", page.page, page.count);
    if let Some(next) = page.next {
        line.push_str(&format!("; next: --page {}", next));
    }
    println!("{}", style(line).dim());
}
