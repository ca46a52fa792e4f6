//! Squirrel census dashboard - command-line front end.
//!
//! Loads the sightings table described by the connection config, applies
//! the date and shift filters, and prints the dashboard as text or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squirrel_census::config::{resolve_config_path, SourceConfig, CONFIG_ENV_VAR};
use squirrel_census::dashboard::{self, DashboardControls};
use squirrel_census::filter::{date_options, DateSelection};
use squirrel_census::report::render_text;
use squirrel_census::schema::ALL_DATES;
use squirrel_census::source::FileSource;
use squirrel_census::SightingStore;

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Central Park squirrel census dashboard
#[derive(Parser, Debug)]
#[command(name = "squirrel-census", version, about)]
struct Args {
    /// Connection config (JSON)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Date to show on the maps, or "All dates"
    #[arg(short, long, default_value = ALL_DATES)]
    date: String,

    /// Hide morning sightings
    #[arg(long)]
    no_am: bool,

    /// Hide afternoon sightings
    #[arg(long)]
    no_pm: bool,

    /// Include the first rows of the filtered table
    #[arg(long)]
    show_raw: bool,

    /// Print the date selector options and exit
    #[arg(long)]
    list_dates: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "squirrel_census=info",
        1 => "squirrel_census=debug",
        _ => "squirrel_census=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = resolve_config_path(args.config.as_deref());
    info!("Config: {}", config_path.display());
    let config = SourceConfig::from_file(&config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;

    let store = SightingStore::new(FileSource::from_config(&config)).with_bounds(config.bounds);
    let table = store
        .table()
        .with_context(|| format!("Failed to load table '{}'", config.table))?;

    if args.list_dates {
        for option in date_options(table)? {
            println!("{option}");
        }
        return Ok(());
    }

    let controls = DashboardControls {
        date: DateSelection::from_label(&args.date),
        show_raw: args.show_raw,
        ..DashboardControls::default()
    }
    .with_shift_toggles(!args.no_am, !args.no_pm);

    let view = dashboard::build(table, &controls).context("Failed to build dashboard")?;
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&view)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}
