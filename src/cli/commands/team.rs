//! `pitlane team` command - Team listing

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::helpers::{print_page_footer, print_structured, PageArgs, Workspace};
use crate::cli::table::{columns_to_keys, CellValue, ColumnDef, ColumnKey, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::TeamId;
use crate::core::query::{OrderBy, TeamFilter, TeamQuery};
use crate::entities::Team;

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List teams
    List(ListArgs),

    /// Show a team and its cars
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search team name and country
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Order by field (name, country); prefix with '-' for descending
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    pub ordering: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Name,
        ListColumn::Country,
        ListColumn::Principal,
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
    /// Team id (e.g. 3 or TEAM-3)
    pub id: TeamId,
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Name,
    Country,
    Principal,
}

impl ColumnKey for ListColumn {
    fn key(&self) -> &'static str {
        match self {
            ListColumn::Name => "name",
            ListColumn::Country => "country",
            ListColumn::Principal => "principal",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

const TEAM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("country", "COUNTRY", 20),
    ColumnDef::new("principal", "PRINCIPAL", 26),
];

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::List(args) => run_list(args, global),
        TeamCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut query = TeamQuery::new(TeamFilter);
    query.search = args.search.clone();
    query.ordering = args.ordering.as_deref().and_then(OrderBy::parse);

    let page = ws
        .snapshot
        .list_teams(&query, ws.page_request(&args.page)?)
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
                println!("No teams found.");
                return Ok(());
            }
            let rows = page.results.iter().map(team_row);
            TableFormatter::new(TEAM_COLUMNS, "team").output(
                rows,
                format,
                &columns_to_keys(&args.columns),
            );
            print_page_footer(&page);
        }
    }
    Ok(())
}

fn team_row(team: &Team) -> TableRow {
    TableRow::new(team.labelled_id())
        .cell("name", CellValue::Text(team.name.clone()))
        .cell(
            "country",
            team.country.clone().map_or(CellValue::Empty, CellValue::Text),
        )
        .cell(
            "principal",
            team.principal_name
                .clone()
                .map_or(CellValue::Empty, CellValue::Text),
        )
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let team = ws
        .snapshot
        .get_team(args.id)
        .ok_or_else(|| miette::miette!("No team found with id {}", args.id.labelled()))?;

    match ws.format(global, OutputFormat::Auto) {
        OutputFormat::Json => print_structured(team, OutputFormat::Json)?,
        OutputFormat::Yaml => print_structured(team, OutputFormat::Yaml)?,
        OutputFormat::Id => println!("{}", team.labelled_id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(team.labelled_id()).cyan());
            println!("{}: {}", style("Name").bold(), style(&team.name).yellow());
            if let Some(country) = &team.country {
                println!("{}: {}", style("Country").bold(), country);
            }
            if let Some(principal) = &team.principal_name {
                println!("{}: {}", style("Principal").bold(), principal);
            }
            println!("{}", style("─".repeat(60)).dim());

            let mut cars: Vec<_> = ws
                .snapshot
                .cars()
                .iter()
                .filter(|c| c.team == team.team_id)
                .collect();
            cars.sort_by_key(|c| c.car_number);
            if !cars.is_empty() {
                println!();
                println!("{}", style("Cars:").bold());
                for car in cars {
                    println!(
                        "  {} #{} {} ({})",
                        style(car.labelled_id()).cyan(),
                        car.car_number,
                        car.chassis_number,
                        car.status
                    );
                }
            }
        }
    }
    Ok(())
}
