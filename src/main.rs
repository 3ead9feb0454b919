//! `annolens` CLI - Review classifier annotations against a media timeline

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use annolens::annotate::{Dimensions, ListingFormat};
use annolens::load_config;

#[derive(Parser)]
#[command(name = "annolens")]
#[command(about = "Review time-stamped classifier annotations against a media timeline")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/annolens/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Annotation files shared by every command
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Predictions JSON file (array of records)
    predictions: PathBuf,

    /// Ground-truth labels JSON file
    #[arg(short, long)]
    labels: Option<PathBuf>,
}

/// Filter switches applied on top of the config file
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Hide a classifier (repeatable)
    #[arg(long = "disable-classifier", value_name = "NAME")]
    disable_classifiers: Vec<String>,

    /// Hide a model (repeatable)
    #[arg(long = "disable-model", value_name = "NAME")]
    disable_models: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every active annotation in time order
    List {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format (default from config, else text)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Show the active annotations of one second, or its overlay
    Bucket {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Playback position in seconds
        #[arg(long)]
        at: f64,

        /// Intrinsic media size, e.g. 1920x1080 (prints the overlay)
        #[arg(long, value_parser = parse_dimensions)]
        native: Option<Dimensions>,

        /// Displayed media size, e.g. 960x540 (prints the overlay)
        #[arg(long, value_parser = parse_dimensions)]
        displayed: Option<Dimensions>,

        /// Output format for the listing
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Show classifier and model filters with annotation counts
    Filters {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Replay the timeline against simulated engines
    Replay {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Media duration in seconds (default: last annotation + 1s)
        #[arg(long)]
        duration: Option<f64>,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Tick period in milliseconds (default from config)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Media time at which the waveform engine reports ready
        #[arg(long, default_value = "0.0")]
        ready_after: f64,

        /// Make the waveform engine fail with this message
        #[arg(long, value_name = "MESSAGE")]
        fail_secondary: Option<String>,

        /// Seek on the waveform once it is ready (seconds)
        #[arg(long)]
        seek: Option<f64>,

        /// Media reference handed to both engines
        #[arg(long, default_value = "media")]
        media: String,

        /// Intrinsic media size, e.g. 1920x1080
        #[arg(long, value_parser = parse_dimensions)]
        native: Option<Dimensions>,

        /// Displayed media size, e.g. 960x540
        #[arg(long, value_parser = parse_dimensions)]
        displayed: Option<Dimensions>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
    Markdown,
}

impl From<FormatArg> for ListingFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ListingFormat::Text,
            FormatArg::Json => ListingFormat::Json,
            FormatArg::Markdown => ListingFormat::Markdown,
        }
    }
}

fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    Dimensions::parse(s).ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            input,
            filters,
            format,
        } => {
            let format = format.map_or(config.listing.format, ListingFormat::from);
            cmd::list::cmd_list(&input, &filters, format, &config)?;
        }
        Commands::Bucket {
            input,
            filters,
            at,
            native,
            displayed,
            format,
        } => {
            let format = format.map_or(config.listing.format, ListingFormat::from);
            let overlay = (native.is_some() || displayed.is_some()).then_some((native, displayed));
            cmd::bucket::cmd_bucket(&input, &filters, at, overlay, format, &config)?;
        }
        Commands::Filters { input, filters } => {
            cmd::filters::cmd_filters(&input, &filters, &config)?;
        }
        Commands::Replay {
            input,
            filters,
            duration,
            speed,
            tick_ms,
            ready_after,
            fail_secondary,
            seek,
            media,
            native,
            displayed,
        } => {
            let options = cmd::replay::ReplayOptions {
                duration,
                speed,
                tick_ms,
                ready_after,
                fail_secondary,
                seek,
                media,
                native,
                displayed,
            };
            cmd::replay::cmd_replay(&input, &filters, options, &config).await?;
        }
    }

    Ok(())
}
