//! Reward Runner CLI

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reward_runner::{
    batch::{generation_samples, load_batch_from_file},
    config::Config,
    genlog::{AggregateGenerationLogger, GenerationLogger},
    reporting::{print_console_report, write_records, BatchSummary},
};
use lenreward::{RewardScorer, ScoringMode};

#[derive(Parser)]
#[command(name = "reward-runner")]
#[command(about = "Batch reward scoring with batch-derived length penalties")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of responses
    Score {
        /// Batch file: JSON array or JSON Lines
        #[arg(short, long)]
        input: PathBuf,

        /// Scoring mode (format_weighted, accuracy, safe_zone, tolerance_zone)
        #[arg(short, long)]
        mode: Option<String>,

        /// Length at which the penalty saturates at -1
        #[arg(long)]
        hard_limit: Option<usize>,

        /// Tolerance zone widening factor
        #[arg(long)]
        tolerance_factor: Option<f64>,

        /// Weight of the format check in format_weighted mode
        #[arg(long)]
        format_weight: Option<f64>,

        /// Write per-sample records as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a batch summary as JSON
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Step number attached to logged generations
        #[arg(long, default_value = "0")]
        step: u64,

        /// Send samples to the configured generation loggers
        #[arg(long)]
        log_generations: bool,
    },

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/reward.toml")]
        output: PathBuf,
    },
}

struct ScoreArgs {
    input: PathBuf,
    mode: Option<String>,
    hard_limit: Option<usize>,
    tolerance_factor: Option<f64>,
    format_weight: Option<f64>,
    output: Option<PathBuf>,
    summary: Option<PathBuf>,
    step: u64,
    log_generations: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("reward_runner=debug,lenreward=debug,info")
    } else {
        EnvFilter::new("reward_runner=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Score {
            input,
            mode,
            hard_limit,
            tolerance_factor,
            format_weight,
            output,
            summary,
            step,
            log_generations,
        } => {
            let args = ScoreArgs {
                input,
                mode,
                hard_limit,
                tolerance_factor,
                format_weight,
                output,
                summary,
                step,
                log_generations,
            };
            score(cli.config, args).await
        }

        Commands::InitConfig { output } => init_config(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = Config::from_file(&path)?;
            tracing::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(Config::load_or_default()),
    }
}

async fn score(
    config_path: Option<PathBuf>,
    args: ScoreArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let run_id = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let mut config = load_config(config_path)?;

    // Command-line flags override the file
    if let Some(mode) = args.mode {
        config.reward.mode = mode.parse::<ScoringMode>()?;
    }
    if let Some(hard_limit) = args.hard_limit {
        config.reward.hard_limit = hard_limit;
    }
    if let Some(tolerance_factor) = args.tolerance_factor {
        config.reward.tolerance_factor = tolerance_factor;
    }
    if let Some(format_weight) = args.format_weight {
        config.reward.format_weight = format_weight;
    }

    let scorer = RewardScorer::new(config.reward.clone())?;
    let batch = load_batch_from_file(&args.input)?;
    tracing::debug!("Loaded batch from {}", args.input.display());

    let records = scorer.score_json(&batch)?;
    let summary = BatchSummary::from_records(&run_id, config.reward.mode, &records);
    print_console_report(&summary, &records);

    if let Some(path) = &args.output {
        write_records(path, &records)?;
        println!("Records written to: {}", path.display());
    }
    if let Some(path) = &args.summary {
        summary.write_to_file(path)?;
        println!("Summary written to: {}", path.display());
    }

    if args.log_generations {
        let logger = AggregateGenerationLogger::from_config(&config.logging);
        if logger.is_empty() {
            tracing::warn!("No generation loggers available");
        } else if let Some(items) = batch.as_array() {
            logger.log(&generation_samples(items, &records), args.step);
            logger.close().await;
        }
    }

    Ok(())
}

fn init_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save_toml(&output)?;
    println!("Configuration written to: {}", output.display());
    Ok(())
}
