use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use silhouette_core::*;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "silhouette")]
#[command(about = "Body measurement estimation for outfit sizing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read the measurement set from this JSON file instead of stdin
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in missing measurements and apply adjustments
    Estimate {
        /// Season for the seasonal adjustment (winter, spring, summer, fall)
        #[arg(long)]
        season: Option<Season>,

        /// Derive the season from this instant (RFC 3339)
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Back-fill proportions from body-type ratios first (includes age adjustment)
        #[arg(long, conflicts_with = "age_adjust")]
        by_body_type: bool,

        /// Apply the age adjustment to the result
        #[arg(long)]
        age_adjust: bool,
    },

    /// Classify the body type
    BodyType,

    /// Compute a cup size from bust and underbust (cm)
    CupSize {
        #[arg(long)]
        bust: f64,

        #[arg(long)]
        underbust: f64,
    },

    /// Convert to another measurement system
    Convert {
        /// Target system (metric, imperial, asian, european)
        #[arg(long)]
        to: MeasurementSystem,
    },

    /// Check ranges and relationships; exits 1 when invalid
    Validate,

    /// Score confidence per measurement
    Score {
        /// Prior observations (.jsonl or .csv)
        #[arg(long)]
        history: Option<PathBuf>,

        /// When the measurements were taken (RFC 3339)
        #[arg(long)]
        observed_at: Option<DateTime<Utc>>,

        /// Score recency relative to this instant (RFC 3339)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Estimate, validate, score and optionally convert in one step
    Assess {
        /// Target system; defaults to the configured output system
        #[arg(long)]
        to: Option<MeasurementSystem>,

        #[arg(long)]
        history: Option<PathBuf>,

        #[arg(long)]
        observed_at: Option<DateTime<Utc>>,

        #[arg(long)]
        season: Option<Season>,

        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Print reference ranges, defaults and rules
    Guide,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = silhouette_core::logging::level_for_verbosity(cli.verbose);
    silhouette_core::logging::init_with_level(level);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using config: {:?}", config);

    let estimator = MeasurementEstimator::from_config(&config);
    let input = cli.input.as_deref();

    match cli.command {
        Commands::Estimate {
            season,
            now,
            by_body_type,
            age_adjust,
        } => cmd_estimate(
            &estimator,
            input,
            EstimateOptions { season, now },
            by_body_type,
            age_adjust,
        ),
        Commands::BodyType => {
            let measurements = read_measurements(input)?;
            let body_type = estimator.determine_body_type(&measurements);
            print_json(&serde_json::json!({ "body_type": body_type }))
        }
        Commands::CupSize { bust, underbust } => {
            let cup_size = estimator.calculate_cup_size(bust, underbust);
            print_json(&serde_json::json!({ "cup_size": cup_size }))
        }
        Commands::Convert { to } => {
            let measurements = read_measurements(input)?;
            print_json(&estimator.convert(&measurements, to))
        }
        Commands::Validate => cmd_validate(&estimator, input),
        Commands::Score {
            history,
            observed_at,
            now,
        } => {
            let estimator = pin_clock(estimator, now);
            let measurements = read_measurements(input)?;
            let history = read_history(history.as_deref())?;
            let report = estimator.score_confidence(&measurements, history.as_deref(), observed_at);
            print_json(&report)
        }
        Commands::Assess {
            to,
            history,
            observed_at,
            season,
            now,
        } => {
            let estimator = pin_clock(estimator, now);
            let measurements = read_measurements(input)?;
            let history = read_history(history.as_deref())?;
            let options = AssessOptions {
                estimate: EstimateOptions { season, now },
                target: Some(to.unwrap_or(config.output.system)),
                history: history.as_deref(),
                observed_at,
            };
            print_json(&estimator.assess(&measurements, &options)?)
        }
        Commands::Guide => print_json(&estimator.guide()),
    }
}

fn cmd_estimate(
    estimator: &MeasurementEstimator,
    input: Option<&Path>,
    options: EstimateOptions,
    by_body_type: bool,
    age_adjust: bool,
) -> Result<()> {
    let mut measurements = read_measurements(input)?;

    if by_body_type {
        measurements = estimator.estimate_by_body_type(&measurements)?;
    }

    let mut estimated = estimator.estimate(&measurements, &options)?;

    if age_adjust {
        estimated = estimator.adjust_by_age(&estimated)?;
    }

    print_json(&estimated)
}

fn cmd_validate(estimator: &MeasurementEstimator, input: Option<&Path>) -> Result<()> {
    let measurements = read_measurements(input)?;
    let report = estimator.validate(&measurements);
    print_json(&report)?;

    if !report.is_valid {
        for message in report.messages() {
            eprintln!("  - {}", message);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Recency and season derivation read this instant instead of the system clock
fn pin_clock(estimator: MeasurementEstimator, now: Option<DateTime<Utc>>) -> MeasurementEstimator {
    match now {
        Some(now) => estimator.with_clock(Arc::new(FixedClock(now))),
        None => estimator,
    }
}

fn read_measurements(input: Option<&Path>) -> Result<MeasurementSet> {
    let contents = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if contents.trim().is_empty() {
        return Ok(MeasurementSet::new());
    }

    Ok(serde_json::from_str(&contents)?)
}

fn read_history(path: Option<&Path>) -> Result<Option<Vec<MeasurementSet>>> {
    path.map(load_history).transpose()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
