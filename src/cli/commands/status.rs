//! `pitlane status` command - Fleet status dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_distance, format_pct, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::lifecycle::LifecycleTier;
use crate::core::views::PartView;
use crate::core::Snapshot;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show only specific section (fleet, parts, lifecycle, integrity)
    #[arg(long)]
    pub section: Option<String>,

    /// Maximum number of warnings to list
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(serde::Serialize, Default)]
struct FleetMetrics {
    teams: usize,
    cars: usize,
    by_status: BTreeMap<String, usize>,
}

#[derive(serde::Serialize, Default)]
struct PartMetrics {
    total: usize,
    tracked: usize,
    installed: usize,
    spare: usize,
    by_type: BTreeMap<String, usize>,
}

#[derive(serde::Serialize, Default)]
struct LifecycleMetrics {
    by_tier: BTreeMap<String, usize>,
    warnings: usize,
    needs_replacement: usize,
}

#[derive(serde::Serialize, Default)]
struct IntegrityMetrics {
    installations: usize,
    active: usize,
    issues: usize,
    skipped_files: usize,
}

#[derive(serde::Serialize)]
struct WarningRow {
    id: String,
    part_type: String,
    serial_number: String,
    current_mileage: Option<i64>,
    fia_lifecycle_limit: Option<i64>,
    lifecycle_percentage: Option<f64>,
    needs_replacement: bool,
}

impl From<&PartView> for WarningRow {
    fn from(view: &PartView) -> Self {
        Self {
            id: view.part.labelled_id(),
            part_type: view.part.part_type.clone(),
            serial_number: view.part.serial_number.clone(),
            current_mileage: view.current_mileage,
            fia_lifecycle_limit: view.part.fia_lifecycle_limit,
            lifecycle_percentage: view.lifecycle_percentage,
            needs_replacement: view.needs_replacement,
        }
    }
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let snapshot = &ws.snapshot;

    let fleet = collect_fleet_metrics(snapshot);
    let parts = collect_part_metrics(snapshot);
    let lifecycle = collect_lifecycle_metrics(snapshot);
    let integrity = collect_integrity_metrics(snapshot, ws.skipped.len());
    let warnings: Vec<WarningRow> = snapshot
        .lifecycle_warnings()
        .into_iter()
        .take(args.limit)
        .map(WarningRow::from)
        .collect();

    let format = ws.format(global, OutputFormat::Auto);
    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "fleet": fleet,
                "parts": parts,
                "lifecycle": lifecycle,
                "integrity": integrity,
                "warnings": warnings,
                "health": calculate_health(&lifecycle, &integrity),
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        OutputFormat::Md => {
            print!("{}", markdown_report(&fleet, &parts, &lifecycle, &integrity, &warnings));
        }
        _ => {
            let width = 68;

            println!("{}", style("Pitlane Fleet Status").bold().underlined());
            println!("{}", "═".repeat(width));
            println!();

            let show = |name: &str| args.section.as_deref().map_or(true, |s| s == name);

            if show("fleet") || show("parts") {
                print_two_columns(
                    "FLEET",
                    &format_fleet_metrics(&fleet),
                    "PARTS",
                    &format_part_metrics(&parts),
                );
                println!();
            }

            if show("lifecycle") || show("integrity") {
                print_two_columns(
                    "LIFECYCLE",
                    &format_lifecycle_metrics(&lifecycle),
                    "INTEGRITY",
                    &format_integrity_metrics(&integrity),
                );
                println!();
            }

            if show("lifecycle") && !warnings.is_empty() {
                println!("{}", style("LIFECYCLE WARNINGS").bold());
                println!("{}", warnings_table(&warnings).with(Style::rounded()));
                println!();
            }

            println!("{}", "═".repeat(width));

            let health = calculate_health(&lifecycle, &integrity);
            let health_style = match health {
                "Healthy" => style(health).green().bold(),
                "Warning" => style(health).yellow().bold(),
                _ => style(health).red().bold(),
            };
            println!("Fleet Health: {}", health_style);
        }
    }

    Ok(())
}

fn collect_fleet_metrics(snapshot: &Snapshot) -> FleetMetrics {
    let mut metrics = FleetMetrics {
        teams: snapshot.teams().len(),
        cars: snapshot.cars().len(),
        ..Default::default()
    };
    for car in snapshot.cars() {
        *metrics
            .by_status
            .entry(car.status_class().to_string())
            .or_insert(0) += 1;
    }
    metrics
}

fn collect_part_metrics(snapshot: &Snapshot) -> PartMetrics {
    let mut metrics = PartMetrics::default();
    for view in snapshot.part_views() {
        metrics.total += 1;
        if view.part.fia_lifecycle_limit.is_some_and(|limit| limit > 0) {
            metrics.tracked += 1;
        }
        if view.is_installed {
            metrics.installed += 1;
        } else {
            metrics.spare += 1;
        }
        *metrics.by_type.entry(view.part.part_type.clone()).or_insert(0) += 1;
    }
    metrics
}

fn collect_lifecycle_metrics(snapshot: &Snapshot) -> LifecycleMetrics {
    let mut metrics = LifecycleMetrics::default();
    for tier in LifecycleTier::all() {
        metrics.by_tier.insert(tier.to_string(), 0);
    }
    for view in snapshot.part_views() {
        *metrics.by_tier.entry(view.lifecycle_tier.to_string()).or_insert(0) += 1;
        if view.needs_replacement {
            metrics.needs_replacement += 1;
        }
    }
    metrics.warnings = snapshot.lifecycle_warnings().len();
    metrics
}

fn collect_integrity_metrics(snapshot: &Snapshot, skipped_files: usize) -> IntegrityMetrics {
    IntegrityMetrics {
        installations: snapshot.car_parts().len(),
        active: snapshot.car_parts().iter().filter(|r| r.is_active()).count(),
        issues: snapshot.check().len(),
        skipped_files,
    }
}

fn format_fleet_metrics(m: &FleetMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("Teams:       {}", m.teams),
        format!("Cars:        {}", m.cars),
    ];
    for (class, count) in &m.by_status {
        lines.push(format!("  {:<11}{}", format!("{}:", class), count));
    }
    lines
}

fn format_part_metrics(m: &PartMetrics) -> Vec<String> {
    vec![
        format!("Total:       {}", m.total),
        format!("Tracked:     {}", m.tracked),
        format!("Installed:   {}", m.installed),
        format!("Spare:       {}", m.spare),
        format!("Types:       {}", m.by_type.len()),
    ]
}

fn format_lifecycle_metrics(m: &LifecycleMetrics) -> Vec<String> {
    let count = |tier: LifecycleTier| *m.by_tier.get(&tier.to_string()).unwrap_or(&0);
    let mut lines = vec![
        format!("Good:        {}", count(LifecycleTier::Good)),
        format!("Warning:     {}", count(LifecycleTier::Warning)),
        format!("Critical:    {}", count(LifecycleTier::Critical)),
        format!("No Data:     {}", count(LifecycleTier::Unknown)),
    ];
    if m.needs_replacement > 0 {
        lines.push(format!("Replace:     {} {}", m.needs_replacement, style("⚠").red()));
    }
    lines
}

fn format_integrity_metrics(m: &IntegrityMetrics) -> Vec<String> {
    let mut lines = vec![
        format!("Installs:    {}", m.installations),
        format!("Active:      {}", m.active),
    ];
    if m.issues > 0 {
        lines.push(format!("Issues:      {} {}", m.issues, style("⚠").yellow()));
    } else {
        lines.push(format!("Issues:      {}", m.issues));
    }
    if m.skipped_files > 0 {
        lines.push(format!("Skipped:     {} {}", m.skipped_files, style("⚠").yellow()));
    }
    lines
}

fn warnings_table(rows: &[WarningRow]) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Type", "Serial", "Mileage", "Limit", "Used", "Replace"]);
    for row in rows {
        builder.push_record([
            row.id.clone(),
            row.part_type.clone(),
            row.serial_number.clone(),
            format_distance(row.current_mileage),
            format_distance(row.fia_lifecycle_limit),
            format_pct(row.lifecycle_percentage),
            if row.needs_replacement { "yes" } else { "" }.to_string(),
        ]);
    }
    builder.build()
}

fn markdown_report(
    fleet: &FleetMetrics,
    parts: &PartMetrics,
    lifecycle: &LifecycleMetrics,
    integrity: &IntegrityMetrics,
    warnings: &[WarningRow],
) -> String {
    let mut output = String::new();
    output.push_str("# Fleet Status\n\n");

    output.push_str("## Summary\n\n");
    output.push_str(&format!("- **Teams:** {}\n", fleet.teams));
    output.push_str(&format!("- **Cars:** {}\n", fleet.cars));
    output.push_str(&format!(
        "- **Parts:** {} ({} installed, {} spare)\n",
        parts.total, parts.installed, parts.spare
    ));
    output.push_str(&format!("- **Installations:** {}\n", integrity.installations));
    output.push_str(&format!("- **Lifecycle warnings:** {}\n", lifecycle.warnings));
    output.push_str(&format!("- **Needs replacement:** {}\n", lifecycle.needs_replacement));
    output.push_str(&format!("- **Integrity issues:** {}\n", integrity.issues));

    if !warnings.is_empty() {
        output.push_str("\n## Lifecycle Warnings\n\n");
        output.push_str(&warnings_table(warnings).with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 32;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());
    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<30} {}", l1, l2);
    }
}

fn calculate_health(lifecycle: &LifecycleMetrics, integrity: &IntegrityMetrics) -> &'static str {
    if lifecycle.needs_replacement > 0 || integrity.issues > 0 {
        "Critical"
    } else if lifecycle.warnings > 0 || integrity.skipped_files > 0 {
        "Warning"
    } else {
        "Healthy"
    }
}
