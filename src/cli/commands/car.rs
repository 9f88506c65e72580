//! `pitlane car` command - Cars and their installation history

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::commands::install::{car_part_row, InstallColumn, INSTALL_COLUMNS};
use crate::cli::helpers::{print_page_footer, print_structured, PageArgs, Workspace};
use crate::cli::table::{columns_to_keys, CellValue, ColumnDef, ColumnKey, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::{CarId, TeamId};
use crate::core::query::{CarFilter, CarQuery, OrderBy};
use crate::core::views::CarView;

#[derive(Subcommand, Debug)]
pub enum CarCommands {
    /// List cars with filtering
    List(ListArgs),

    /// Show a car and what is currently fitted to it
    Show(ShowArgs),

    /// Installation history, most recent first
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by owning team (e.g. 1 or TEAM-1)
    #[arg(long, short = 't')]
    pub team: Option<TeamId>,

    /// Filter by status (exact match on the recorded status)
    #[arg(long)]
    pub status: Option<String>,

    /// Search chassis number and car number
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Order by field (car_number, status, chassis_number); prefix with '-' for descending
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    pub ordering: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Number,
        ListColumn::Chassis,
        ListColumn::Team,
        ListColumn::Status,
    ])]
    pub columns: Vec<ListColumn>,

    #[command(flatten)]
    pub page: PageArgs,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Car id (e.g. 7 or CAR-7)
    pub id: CarId,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Car id (e.g. 7 or CAR-7)
    pub id: CarId,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        InstallColumn::PartType,
        InstallColumn::Serial,
        InstallColumn::Installed,
        InstallColumn::Removed,
        InstallColumn::Mileage,
        InstallColumn::Lifecycle,
        InstallColumn::Active,
    ])]
    pub columns: Vec<InstallColumn>,

    /// Paginate instead of printing the whole timeline
    #[arg(long)]
    pub paged: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Number,
    Chassis,
    Team,
    Status,
    Class,
}

impl ColumnKey for ListColumn {
    fn key(&self) -> &'static str {
        match self {
            ListColumn::Number => "number",
            ListColumn::Chassis => "chassis",
            ListColumn::Team => "team",
            ListColumn::Status => "status",
            ListColumn::Class => "class",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

const CAR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("number", "NO", 6),
    ColumnDef::new("chassis", "CHASSIS", 20),
    ColumnDef::new("team", "TEAM", 24),
    ColumnDef::new("status", "STATUS", 14),
    ColumnDef::new("class", "CLASS", 12),
];

pub fn run(cmd: CarCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CarCommands::List(args) => run_list(args, global),
        CarCommands::Show(args) => run_show(args, global),
        CarCommands::History(args) => run_history(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut query = CarQuery::new(CarFilter {
        team: args.team,
        status: args.status.clone(),
    });
    query.search = args.search.clone();
    query.ordering = args.ordering.as_deref().and_then(OrderBy::parse);

    let page = ws
        .snapshot
        .list_cars(&query, ws.page_request(&args.page)?)
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
                println!("No cars found.");
                return Ok(());
            }
            TableFormatter::new(CAR_COLUMNS, "car").output(
                page.results.iter().map(car_row),
                format,
                &columns_to_keys(&args.columns),
            );
            print_page_footer(&page);
        }
    }
    Ok(())
}

fn car_row(view: &CarView) -> TableRow {
    TableRow::new(view.car.labelled_id())
        .cell("number", CellValue::Number(view.car.car_number))
        .cell("chassis", CellValue::Text(view.car.chassis_number.clone()))
        .cell(
            "team",
            view.team_name
                .clone()
                .map_or(CellValue::Id(view.car.team.labelled()), CellValue::Text),
        )
        .cell("status", CellValue::CarStatus(view.car.status.clone()))
        .cell("class", CellValue::Type(view.status_class.to_string()))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let view = ws
        .snapshot
        .get_car(args.id)
        .ok_or_else(|| miette::miette!("No car found with id {}", args.id.labelled()))?;

    match ws.format(global, OutputFormat::Auto) {
        OutputFormat::Json => print_structured(&view, OutputFormat::Json)?,
        OutputFormat::Yaml => print_structured(&view, OutputFormat::Yaml)?,
        OutputFormat::Id => println!("{}", view.car.labelled_id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(view.car.labelled_id()).cyan());
            println!("{}: #{}", style("Number").bold(), view.car.car_number);
            println!("{}: {}", style("Chassis").bold(), style(&view.car.chassis_number).yellow());
            println!(
                "{}: {}",
                style("Team").bold(),
                view.team_name
                    .clone()
                    .unwrap_or_else(|| format!("{} (unknown)", view.car.team.labelled()))
            );
            println!(
                "{}: {} ({})",
                style("Status").bold(),
                view.car.status,
                view.status_class
            );
            println!("{}", style("─".repeat(60)).dim());

            let timeline = ws.snapshot.car_part_history(view.car.car_id);
            let fitted: Vec<_> = timeline.active().collect();
            println!();
            if fitted.is_empty() {
                println!("{}", style("No parts currently fitted.").dim());
            } else {
                println!("{}", style("Fitted parts:").bold());
                for entry in fitted {
                    let part_pct = ws
                        .snapshot
                        .get_part(entry.record.part)
                        .and_then(|p| p.lifecycle_percentage);
                    println!(
                        "  {} {} {} since {} ({} cumulative)",
                        style(entry.record.part.labelled()).cyan(),
                        entry.part_type.as_deref().unwrap_or("?"),
                        entry.serial_number.as_deref().unwrap_or("?"),
                        entry.record.installed_at.format("%Y-%m-%d"),
                        CellValue::Percentage(part_pct).format_md()
                    );
                }
            }
            if timeline.has_issues() && !global.quiet {
                println!();
                println!(
                    "{} {} issue(s) in this car's history; see {}",
                    style("!").yellow(),
                    timeline.issues.len(),
                    style(format!("pitlane car history {}", view.car.car_id)).yellow()
                );
            }
        }
    }
    Ok(())
}

fn run_history(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    if ws.snapshot.get_car(args.id).is_none() {
        // History of an unknown car is still reconstructed from its records
        tracing::warn!(car = %args.id, "car not in snapshot");
    }
    let format = ws.format(global, OutputFormat::Tsv);
    let keys = columns_to_keys(&args.columns);

    if args.paged {
        let page = ws
            .snapshot
            .car_history_page(args.id, ws.page_request(&args.page)?);
        match format {
            OutputFormat::Json | OutputFormat::Yaml => print_structured(&page, format)?,
            _ => {
                TableFormatter::new(INSTALL_COLUMNS, "installation").output(
                    page.results.iter().map(car_part_row),
                    format,
                    &keys,
                );
                print_page_footer(&page);
            }
        }
        return Ok(());
    }

    let timeline = ws.snapshot.car_part_history(args.id);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&timeline, format)?,
        _ => {
            if timeline.is_empty() {
                println!("No installations recorded for {}.", args.id.labelled());
                return Ok(());
            }
            TableFormatter::new(INSTALL_COLUMNS, "installation").output(
                timeline.entries.iter().map(car_part_row),
                format,
                &keys,
            );
            if timeline.has_issues() && !global.quiet {
                eprintln!();
                for issue in &timeline.issues {
                    eprintln!("{} {}", style("!").yellow(), issue);
                }
            }
        }
    }
    Ok(())
}
