//! `pitlane validate` command - Check the snapshot for unreadable files and inconsistent records

use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::integrity::IntegrityIssue;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,

    /// Only check record consistency; ignore files that failed to load
    #[arg(long)]
    pub records_only: bool,
}

#[derive(serde::Serialize)]
struct SkippedReport {
    path: String,
    error: String,
}

#[derive(serde::Serialize)]
struct ValidationReport<'a> {
    records_checked: usize,
    skipped: Vec<SkippedReport>,
    issues: &'a [IntegrityIssue],
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(&GlobalOpts {
        quiet: true,
        ..global.clone()
    })?;
    let format = ws.format(global, OutputFormat::Auto);
    let snapshot = &ws.snapshot;

    let records_checked = snapshot.teams().len()
        + snapshot.cars().len()
        + snapshot.parts().len()
        + snapshot.car_parts().len();
    let issues = snapshot.check();
    let skipped = if args.records_only {
        Vec::new()
    } else {
        ws.skipped
    };
    let failed = !issues.is_empty() || !skipped.is_empty();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let report = ValidationReport {
                records_checked,
                skipped: skipped
                    .iter()
                    .map(|s| SkippedReport {
                        path: s.path.display().to_string(),
                        error: s.error.to_string(),
                    })
                    .collect(),
                issues: &issues,
            };
            print_structured(&report, format)?;
        }
        _ => {
            let skipped_count = skipped.len();
            if !args.summary {
                for file in skipped {
                    println!("{} {}", style("✗").red(), file.path.display());
                    println!("{:?}", miette::Report::new(file.error));
                }
                for issue in &issues {
                    println!("{} {}", style("!").yellow(), issue);
                }
                if failed {
                    println!();
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!("{}", style("Validation Summary").bold());
            println!("{}", style("─".repeat(60)).dim());
            println!("  Records checked: {}", style(records_checked).cyan());
            println!("  Files skipped:   {}", style(skipped_count).red());
            println!("  Record issues:   {}", style(issues.len()).yellow());
            println!();

            if !failed {
                println!("{} Snapshot is consistent!", style("✓").green().bold());
            }
        }
    }

    if failed {
        Err(miette::miette!("Validation failed: snapshot has errors"))
    } else {
        Ok(())
    }
}
