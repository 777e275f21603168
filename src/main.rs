use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::sync::Arc;

use payment_sequencer::config::Config;
use payment_sequencer::format::format_currency;
use payment_sequencer::logging;
use payment_sequencer::render::{JsonLinesSurface, TerminalSurface};
use payment_sequencer::sequencer::{
    failure_message, ForcedOutcome, InstantClock, RandomSource, RenderSurface, SequencerError,
    StepSequencer,
};

/// Exit code for a run that was cancelled or could not start
const EXIT_ABORTED: u8 = 2;

#[derive(Parser)]
#[command(name = "paysim")]
#[command(about = "Simulated multi-step payment processing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulated payment (default)
    Run(RunArgs),

    /// List the processing steps and the failure message at each
    Steps,

    /// Show the effective configuration
    Config {
        /// Write it to .paysim/config.toml
        #[arg(short, long)]
        write: bool,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Payment amount shown in the header
    #[arg(long)]
    amount: Option<f64>,

    /// Currency code for the amount (USD, EUR, GBP, NGN, CAD)
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Seed for a reproducible outcome draw
    #[arg(long)]
    seed: Option<u64>,

    /// Force the outcome instead of drawing it
    #[arg(long, value_enum)]
    outcome: Option<OutcomeArg>,

    /// Skip the simulated delays
    #[arg(long)]
    fast: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Success,
    Failure,
}

impl From<OutcomeArg> for ForcedOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Success => ForcedOutcome::Success,
            OutcomeArg::Failure => ForcedOutcome::Failure,
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    let code = match cli.command {
        Some(Commands::Run(args)) => cmd_run(&config, args).await?,
        Some(Commands::Steps) => cmd_steps(&config),
        Some(Commands::Config { write }) => cmd_config(&config, write)?,
        None => cmd_run(&config, RunArgs::default()).await?,
    };

    if let Some(log_path) = logging_handle.log_file_path {
        if log_path.exists() {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    Ok(code)
}

async fn cmd_run(config: &Config, args: RunArgs) -> Result<ExitCode> {
    let mut settings = config.sequencer_settings();
    if let Some(outcome) = args.outcome {
        settings.forced_outcome = Some(outcome.into());
    }

    let surface: Arc<dyn RenderSurface> = match args.format {
        OutputFormat::Text => {
            match args.amount {
                Some(amount) => println!(
                    "Processing payment of {}",
                    format_currency(amount, &args.currency)
                ),
                None => println!("Processing payment"),
            }
            println!();
            Arc::new(TerminalSurface::stdout())
        }
        OutputFormat::Json => Arc::new(JsonLinesSurface::stdout()),
    };

    let mut builder = StepSequencer::builder(surface);
    if args.fast {
        builder = builder.with_clock(Arc::new(InstantClock::new()));
    }
    if let Some(seed) = args.seed {
        builder = builder.with_outcome_source(RandomSource::seeded(seed));
    }

    let sequencer = match builder.initialize(config.steps(), settings) {
        Ok(sequencer) => sequencer,
        Err(e) => {
            tracing::error!(error = %e, "Payment processor failed to start");
            return Ok(ExitCode::from(EXIT_ABORTED));
        }
    };

    let run = sequencer.run();
    tokio::pin!(run);

    // First Ctrl-C warns, second abandons the run
    let mut warned = false;
    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                if warned {
                    sequencer.cancel();
                } else {
                    eprintln!("Payment is still processing. Are you sure you want to leave?");
                    eprintln!("Press Ctrl-C again to cancel.");
                    warned = true;
                }
            }
        }
    };

    match result {
        Ok(summary) if summary.result.is_success() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(SequencerError::Cancelled) => {
            eprintln!("Payment cancelled");
            Ok(ExitCode::from(EXIT_ABORTED))
        }
        Err(e) => {
            tracing::error!(error = %e, "Payment run aborted");
            Ok(ExitCode::from(EXIT_ABORTED))
        }
    }
}

fn cmd_steps(config: &Config) -> ExitCode {
    let labels = &config.steps.labels;
    if labels.is_empty() {
        println!("No steps configured");
        return ExitCode::SUCCESS;
    }

    let failure_point = config.sequencer.failure_step_index.min(labels.len() - 1);

    println!("Processing Steps ({} steps)", labels.len());
    println!("{}", "─".repeat(60));

    for (index, label) in labels.iter().enumerate() {
        let marker = if index == failure_point { "*" } else { " " };
        let message = failure_message(index);
        println!("{} {}. {}", marker, index + 1, label);
        println!("     on failure: {} ({})", message.title, message.reason);
    }

    println!();
    println!("* failing runs fail at this step");

    ExitCode::SUCCESS
}

fn cmd_config(config: &Config, write: bool) -> Result<ExitCode> {
    if write {
        let path = config.save()?;
        println!("Wrote {}", path.display());
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(ExitCode::SUCCESS)
}
