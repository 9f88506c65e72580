//! `pitlane install` command - Installation records

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::helpers::{format_distance, format_pct, print_page_footer, print_structured, PageArgs, Workspace};
use crate::cli::table::{columns_to_keys, CellValue, ColumnDef, ColumnKey, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::{CarId, CarPartId, PartId};
use crate::core::query::{CarPartFilter, CarPartQuery, OrderBy};
use crate::core::views::CarPartView;

#[derive(Subcommand, Debug)]
pub enum InstallCommands {
    /// List installation records with filtering
    List(ListArgs),

    /// List parts currently fitted to a car
    Active(ActiveArgs),

    /// Show one installation record
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by car (e.g. 7 or CAR-7)
    #[arg(long, short = 'c')]
    pub car: Option<CarId>,

    /// Filter by part (e.g. 12 or PART-12)
    #[arg(long, short = 'p')]
    pub part: Option<PartId>,

    /// Filter by part type (exact match)
    #[arg(long, short = 't')]
    pub part_type: Option<String>,

    /// Filter by part manufacturer (exact match)
    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Only active (true) or only removed (false) installations
    #[arg(long)]
    pub active: Option<bool>,

    /// Search chassis number, serial number and part type
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Order by field (installed_at, removed_at, mileage); prefix with '-' for descending
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    pub ordering: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = default_columns())]
    pub columns: Vec<InstallColumn>,

    #[command(flatten)]
    pub page: PageArgs,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ActiveArgs {
    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = default_columns())]
    pub columns: Vec<InstallColumn>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Installation id (e.g. 40 or INST-40)
    pub id: CarPartId,
}

/// Columns to display for installation records
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum InstallColumn {
    Car,
    Chassis,
    Part,
    PartType,
    Serial,
    Installed,
    Removed,
    Mileage,
    Lifecycle,
    Tier,
    Active,
}

impl ColumnKey for InstallColumn {
    fn key(&self) -> &'static str {
        match self {
            InstallColumn::Car => "car",
            InstallColumn::Chassis => "chassis",
            InstallColumn::Part => "part",
            InstallColumn::PartType => "part-type",
            InstallColumn::Serial => "serial",
            InstallColumn::Installed => "installed",
            InstallColumn::Removed => "removed",
            InstallColumn::Mileage => "mileage",
            InstallColumn::Lifecycle => "lifecycle",
            InstallColumn::Tier => "tier",
            InstallColumn::Active => "active",
        }
    }
}

impl std::fmt::Display for InstallColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn default_columns() -> Vec<InstallColumn> {
    vec![
        InstallColumn::Car,
        InstallColumn::PartType,
        InstallColumn::Serial,
        InstallColumn::Installed,
        InstallColumn::Removed,
        InstallColumn::Mileage,
        InstallColumn::Active,
    ]
}

pub(crate) const INSTALL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("car", "CAR", 10),
    ColumnDef::new("chassis", "CHASSIS", 16),
    ColumnDef::new("part", "PART", 10),
    ColumnDef::new("part-type", "TYPE", 18),
    ColumnDef::new("serial", "SERIAL", 18),
    ColumnDef::new("installed", "INSTALLED", 11),
    ColumnDef::new("removed", "REMOVED", 11),
    ColumnDef::new("mileage", "MILEAGE", 12),
    ColumnDef::new("lifecycle", "INTERVAL %", 11),
    ColumnDef::new("tier", "TIER", 10),
    ColumnDef::new("active", "ACTIVE", 7),
];

pub(crate) fn car_part_row(view: &CarPartView) -> TableRow {
    let text = |value: &Option<String>| value.clone().map_or(CellValue::Empty, CellValue::Text);
    TableRow::new(view.record.labelled_id())
        .cell("car", CellValue::Id(view.record.car.labelled()))
        .cell("chassis", text(&view.chassis_number))
        .cell("part", CellValue::Id(view.record.part.labelled()))
        .cell(
            "part-type",
            view.part_type.clone().map_or(CellValue::Empty, CellValue::Type),
        )
        .cell("serial", text(&view.serial_number))
        .cell("installed", CellValue::Date(view.record.installed_at))
        .cell("removed", CellValue::OptionalDate(view.record.removed_at))
        .cell("mileage", CellValue::Distance(view.record.mileage))
        .cell("lifecycle", CellValue::Percentage(view.lifecycle_percentage))
        .cell("tier", CellValue::Tier(view.lifecycle_tier))
        .cell("active", CellValue::Active(view.is_active))
}

pub fn run(cmd: InstallCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InstallCommands::List(args) => run_list(args, global),
        InstallCommands::Active(args) => run_active(args, global),
        InstallCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut query = CarPartQuery::new(CarPartFilter {
        car: args.car,
        part: args.part,
        is_active: args.active,
        part_type: args.part_type.clone(),
        manufacturer: args.manufacturer.clone(),
    });
    query.search = args.search.clone();
    query.ordering = args.ordering.as_deref().and_then(OrderBy::parse);

    let page = ws
        .snapshot
        .list_car_parts(&query, ws.page_request(&args.page)?)
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
                println!("No installations found.");
                return Ok(());
            }
            TableFormatter::new(INSTALL_COLUMNS, "installation").output(
                page.results.iter().map(car_part_row),
                format,
                &columns_to_keys(&args.columns),
            );
            print_page_footer(&page);
        }
    }
    Ok(())
}

fn run_active(args: ActiveArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let page = ws
        .snapshot
        .active_car_parts(ws.page_request(&args.page)?)
        .map_err(|e| miette::miette!("{}", e))?;

    let format = ws.format(global, OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&page, format)?,
        _ => {
            if page.results.is_empty() {
                println!("No parts currently installed.");
                return Ok(());
            }
            TableFormatter::new(INSTALL_COLUMNS, "active installation").output(
                page.results.iter().map(car_part_row),
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
    let detail = ws
        .snapshot
        .get_car_part(args.id)
        .ok_or_else(|| miette::miette!("No installation found with id {}", args.id.labelled()))?;
    let view = &detail.view;

    match ws.format(global, OutputFormat::Auto) {
        OutputFormat::Json => print_structured(&detail, OutputFormat::Json)?,
        OutputFormat::Yaml => print_structured(&detail, OutputFormat::Yaml)?,
        OutputFormat::Id => println!("{}", view.record.labelled_id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(view.record.labelled_id()).cyan());
            println!(
                "{}: {} {}",
                style("Car").bold(),
                style(view.record.car.labelled()).cyan(),
                view.chassis_number.as_deref().unwrap_or("(unknown car)")
            );
            println!(
                "{}: {} {} {}",
                style("Part").bold(),
                style(view.record.part.labelled()).cyan(),
                view.part_type.as_deref().unwrap_or("(unknown part)"),
                view.serial_number.as_deref().unwrap_or("")
            );
            println!(
                "{}: {}",
                style("Installed").bold(),
                view.record.installed_at.to_rfc3339()
            );
            match view.record.removed_at {
                Some(removed) => println!("{}: {}", style("Removed").bold(), removed.to_rfc3339()),
                None => println!("{}: {}", style("Removed").bold(), style("still fitted").green()),
            }
            println!(
                "{}: {}",
                style("Mileage").bold(),
                format_distance(view.record.mileage)
            );
            println!(
                "{}: {} ({})",
                style("Interval lifecycle").bold(),
                format_pct(view.lifecycle_percentage),
                view.lifecycle_tier.label()
            );
            if let Some(part) = &detail.part {
                println!(
                    "{}: {} of {} ({})",
                    style("Part lifecycle").bold(),
                    format_distance(part.current_mileage),
                    format_distance(part.part.fia_lifecycle_limit),
                    format_pct(part.lifecycle_percentage)
                );
            }
            if let Some(car) = &detail.car {
                println!(
                    "{}: #{} {}",
                    style("Car status").bold(),
                    car.car.car_number,
                    car.status_class
                );
            }
            println!("{}", style("─".repeat(60)).dim());
            for issue in &view.issues {
                println!("{} {}", style("!").yellow(), issue);
            }
        }
    }
    Ok(())
}
