use clap::Parser;
use miette::Result;
use pitlane::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => pitlane::cli::commands::init::run(args),
        Commands::Team(cmd) => pitlane::cli::commands::team::run(cmd, &global),
        Commands::Car(cmd) => pitlane::cli::commands::car::run(cmd, &global),
        Commands::Part(cmd) => pitlane::cli::commands::part::run(cmd, &global),
        Commands::Install(cmd) => pitlane::cli::commands::install::run(cmd, &global),
        Commands::Status(args) => pitlane::cli::commands::status::run(args, &global),
        Commands::Validate(args) => pitlane::cli::commands::validate::run(args, &global),
        Commands::Completions(args) => pitlane::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "pitlane=debug" } else { "pitlane=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
