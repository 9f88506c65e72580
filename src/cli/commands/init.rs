//! `pitlane init` command - Initialize a new pitlane project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::identity::RecordKind;
use crate::core::project::{Project, ProjectError, DEFAULT_DATA_DIR, MARKER_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .pitlane/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized pitlane project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Drop a store export into {}/",
                style("1.").dim(),
                style(DEFAULT_DATA_DIR).cyan()
            );
            println!(
                "  {} Check it for problems",
                style("pitlane validate").yellow()
            );
            println!(
                "  {} See parts nearing their limit",
                style("pitlane part warnings").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} pitlane project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("pitlane init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let mut entries = vec![format!("{}/", MARKER_DIR), format!("{}/config.yaml", MARKER_DIR)];
    for kind in RecordKind::all() {
        entries.push(format!("{}/{}/", DEFAULT_DATA_DIR, kind.directory()));
    }

    for entry in entries {
        if root.join(&entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
