//! `pitlane part` command - Parts and their lifecycle status

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::commands::install::{car_part_row, InstallColumn, INSTALL_COLUMNS};
use crate::cli::helpers::{format_distance, format_pct, print_page_footer, print_structured, PageArgs, Workspace};
use crate::cli::table::{columns_to_keys, CellValue, ColumnDef, ColumnKey, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::PartId;
use crate::core::query::{
    needing_replacement, CarPartFilter, CarPartQuery, OrderBy, PageRequest, PartFilter, PartQuery,
};
use crate::core::views::PartView;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List parts with filtering
    List(ListArgs),

    /// Show a part's lifecycle and installation history
    Show(ShowArgs),

    /// Parts at or above the warning threshold, most worn first
    Warnings(WarningsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by part type (exact match)
    #[arg(long, short = 't')]
    pub part_type: Option<String>,

    /// Filter by manufacturer (exact match)
    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Filter by serial number (exact match)
    #[arg(long)]
    pub serial: Option<String>,

    /// Search serial number, part type and manufacturer
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Order by field (part_type, manufacturer, fia_lifecycle_limit, serial_number,
    /// current_mileage, lifecycle_percentage); prefix with '-' for descending
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    pub ordering: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = default_columns())]
    pub columns: Vec<ListColumn>,

    #[command(flatten)]
    pub page: PageArgs,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part id (e.g. 12 or PART-12)
    pub id: PartId,
}

#[derive(clap::Args, Debug)]
pub struct WarningsArgs {
    /// Only parts at or beyond their regulatory limit
    #[arg(long)]
    pub replacement: bool,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = default_columns())]
    pub columns: Vec<ListColumn>,
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    PartType,
    Serial,
    Manufacturer,
    Limit,
    Mileage,
    Lifecycle,
    Tier,
    Replace,
    Installed,
}

impl ColumnKey for ListColumn {
    fn key(&self) -> &'static str {
        match self {
            ListColumn::PartType => "part-type",
            ListColumn::Serial => "serial",
            ListColumn::Manufacturer => "manufacturer",
            ListColumn::Limit => "limit",
            ListColumn::Mileage => "mileage",
            ListColumn::Lifecycle => "lifecycle",
            ListColumn::Tier => "tier",
            ListColumn::Replace => "replace",
            ListColumn::Installed => "installed",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn default_columns() -> Vec<ListColumn> {
    vec![
        ListColumn::PartType,
        ListColumn::Serial,
        ListColumn::Mileage,
        ListColumn::Limit,
        ListColumn::Lifecycle,
        ListColumn::Tier,
        ListColumn::Installed,
    ]
}

const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part-type", "TYPE", 18),
    ColumnDef::new("serial", "SERIAL", 18),
    ColumnDef::new("manufacturer", "MANUFACTURER", 18),
    ColumnDef::new("mileage", "MILEAGE", 12),
    ColumnDef::new("limit", "LIMIT", 12),
    ColumnDef::new("lifecycle", "LIFECYCLE", 10),
    ColumnDef::new("tier", "TIER", 10),
    ColumnDef::new("replace", "REPLACE", 9),
    ColumnDef::new("installed", "ON CAR", 10),
];

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Warnings(args) => run_warnings(args, global),
    }
}

fn part_row(view: &PartView) -> TableRow {
    TableRow::new(view.part.labelled_id())
        .cell("part-type", CellValue::Type(view.part.part_type.clone()))
        .cell("serial", CellValue::Text(view.part.serial_number.clone()))
        .cell(
            "manufacturer",
            view.part
                .manufacturer
                .clone()
                .map_or(CellValue::Empty, CellValue::Text),
        )
        .cell("mileage", CellValue::Distance(view.current_mileage))
        .cell("limit", CellValue::Distance(view.part.fia_lifecycle_limit))
        .cell("lifecycle", CellValue::Percentage(view.lifecycle_percentage))
        .cell("tier", CellValue::Tier(view.lifecycle_tier))
        .cell("replace", CellValue::Replace(view.needs_replacement))
        .cell(
            "installed",
            view.installed_on
                .map_or(CellValue::Empty, |car| CellValue::Id(car.labelled())),
        )
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut query = PartQuery::new(PartFilter {
        part_type: args.part_type.clone(),
        manufacturer: args.manufacturer.clone(),
        serial_number: args.serial.clone(),
    });
    query.search = args.search.clone();
    query.ordering = args.ordering.as_deref().and_then(OrderBy::parse);

    let page = ws
        .snapshot
        .list_parts(&query, ws.page_request(&args.page)?)
        .map_err(|e| miette::miette!("{}", e))?;

    if args.count {
        println!("{}", page.count);
        return Ok(());
    }

    let format = ws.format(global, OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&page, format)?,
        _ => {
            if page.results.is_empty() {
                println!("No parts found.");
                return Ok(());
            }
            TableFormatter::new(PART_COLUMNS, "part").output(
                page.results.iter().map(part_row),
                format,
                &columns_to_keys(&args.columns),
            );
            print_page_footer(&page);
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let view = ws
        .snapshot
        .get_part(args.id)
        .ok_or_else(|| miette::miette!("No part found with id {}", args.id.labelled()))?;

    match ws.format(global, OutputFormat::Auto) {
        OutputFormat::Json => print_structured(view, OutputFormat::Json)?,
        OutputFormat::Yaml => print_structured(view, OutputFormat::Yaml)?,
        OutputFormat::Id => println!("{}", view.part.labelled_id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(view.part.labelled_id()).cyan());
            println!("{}: {}", style("Type").bold(), style(&view.part.part_type).yellow());
            println!("{}: {}", style("Serial").bold(), view.part.serial_number);
            if let Some(manufacturer) = &view.part.manufacturer {
                println!("{}: {}", style("Manufacturer").bold(), manufacturer);
            }
            println!("{}", style("─".repeat(60)).dim());

            println!();
            println!("{}", style("Lifecycle:").bold());
            println!(
                "  {}: {}",
                style("Cumulative mileage").dim(),
                format_distance(view.current_mileage)
            );
            println!(
                "  {}: {}",
                style("FIA limit").dim(),
                format_distance(view.part.fia_lifecycle_limit)
            );
            println!(
                "  {}: {} {}",
                style("Used").dim(),
                format_pct(view.lifecycle_percentage),
                CellValue::Tier(view.lifecycle_tier).format_tsv(0).trim_end()
            );
            if let Some(remaining) = view.lifecycle().and_then(|lc| lc.remaining_km()) {
                println!("  {}: {} km", style("Remaining").dim(), remaining);
            }
            if view.needs_replacement {
                println!("  {}", style("Needs replacement").red().bold());
            }
            match view.installed_on {
                Some(car) => println!("  {}: {}", style("Installed on").dim(), style(car.labelled()).cyan()),
                None => println!("  {}: {}", style("Installed on").dim(), style("not installed").dim()),
            }

            let query = CarPartQuery::new(CarPartFilter {
                part: Some(view.part.part_id),
                ..Default::default()
            })
            .with_ordering(OrderBy::descending("installed_at"));
            let installs = ws
                .snapshot
                .list_car_parts(&query, PageRequest::all())
                .map_err(|e| miette::miette!("{}", e))?;
            if !installs.results.is_empty() {
                println!();
                println!("{}", style("Installations:").bold());
                let columns = [
                    InstallColumn::Car,
                    InstallColumn::Chassis,
                    InstallColumn::Installed,
                    InstallColumn::Removed,
                    InstallColumn::Mileage,
                    InstallColumn::Active,
                ];
                TableFormatter::new(INSTALL_COLUMNS, "installation")
                    .without_summary()
                    .output(
                        installs.results.iter().map(car_part_row),
                        OutputFormat::Tsv,
                        &columns_to_keys(&columns),
                    );
            }

            for issue in &view.issues {
                println!("{} {}", style("!").yellow(), issue);
            }
        }
    }
    Ok(())
}

fn run_warnings(args: WarningsArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let parts: Vec<&PartView> = if args.replacement {
        needing_replacement(ws.snapshot.part_views())
    } else {
        ws.snapshot.lifecycle_warnings()
    };

    let format = ws.format(global, OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&parts, format)?,
        _ => {
            if parts.is_empty() {
                if args.replacement {
                    println!("No parts at their lifecycle limit.");
                } else {
                    println!("No lifecycle warnings.");
                }
                return Ok(());
            }
            TableFormatter::new(PART_COLUMNS, "part").output(
                parts.into_iter().map(part_row),
                format,
                &columns_to_keys(&args.columns),
            );
        }
    }
    Ok(())
}
