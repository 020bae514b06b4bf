// Guillotine report CLI entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout carries only JSON)
// 2. Parse arguments
// 3. Load config, copying defaults on first run
// 4. Run the subcommand and print its JSON

use anyhow::Context;
use clap::Parser;
use tracing::info;

use guillotine_app::cli::{self, Cli};
use guillotine_app::config;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args = Cli::parse();

    let config = config::load_config(&args.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} seasons, {} weeks",
        config.league.name,
        config.seasons.len(),
        config.league.season_length
    );

    let output = cli::execute(&config, &args.command)?;
    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");

    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("guillotine=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
