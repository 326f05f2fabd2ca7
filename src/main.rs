use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use querylog::output::{self, OutputOptions};
use querylog::stats::{QueryLog, ScanConfig};
use querylog::utils::{AppConfig, get_config_path};
use querylog::utils::progress::{ProgressBar, scan_progress};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "querylog")]
#[command(version, about = "Distinct and top query statistics over large query logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Output the number of distinct queries done during a time range
    Distinct {
        /// Query log file
        file: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Output the top N popular queries (one per line) done during a time range
    Top {
        /// [N] FILE: number of queries to print (default from config), then the log file
        #[arg(num_args = 1..=2, value_names = ["N", "FILE"], required = true)]
        args: Vec<String>,

        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Print the effective configuration as JSON
    Config {
        /// Write the effective configuration to the config file (must not exist yet)
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Range start, in seconds since the epoch (inclusive)
    #[arg(long, value_name = "TIMESTAMP")]
    from: Option<u64>,

    /// Range end, in seconds since the epoch (inclusive)
    #[arg(long, value_name = "TIMESTAMP")]
    to: Option<u64>,

    /// Binary-search the range start and stop early past its end
    #[arg(long, value_name = "yes|no", num_args = 0..=1, default_missing_value = "yes", value_parser = parse_yes_no)]
    fast_seek: Option<bool>,

    /// Tolerated timestamp disorder, in seconds
    #[arg(long, value_name = "SECONDS")]
    jitter: Option<u64>,

    /// Print URL-decoded queries
    #[arg(long)]
    decode: bool,

    /// Emit JSON
    #[arg(long)]
    json: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Do not print the scan summary on stderr
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" => Ok(true),
        "no" | "false" | "off" => Ok(false),
        _ => Err(format!("expected yes or no, got '{}'", value)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load()?;

    match cli.command {
        Commands::Distinct { file, scan } => {
            run_distinct(&file, &scan, &config)?;
        }
        Commands::Top { args, scan } => {
            let (count, file) = split_top_args(&args, config.top)?;
            run_top(&file, count, &scan, &config)?;
        }
        Commands::Config { init } => {
            run_config(&config, init)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `top [N] FILE`: the file is always last
fn split_top_args(args: &[String], default_count: usize) -> Result<(usize, PathBuf)> {
    match args {
        [file] => Ok((default_count, PathBuf::from(file))),
        [count, file] => {
            let count = count
                .parse()
                .with_context(|| format!("malformed number of queries: {}", count))?;
            Ok((count, PathBuf::from(file)))
        }
        _ => bail!("expected [N] FILE"),
    }
}

fn scan_config(scan: &ScanArgs, config: &AppConfig) -> ScanConfig {
    ScanConfig::default()
        .with_fast_seek(
            scan.fast_seek.unwrap_or(config.fast_seek),
            scan.jitter.unwrap_or(config.jitter_seconds),
        )
        .with_range(scan.from, scan.to)
}

fn output_options(scan: &ScanArgs, config: &AppConfig) -> OutputOptions {
    OutputOptions {
        color: matches!(scan.color, ColorMode::Auto),
        decode: scan.decode || config.decode_queries,
        json: scan.json,
    }
}

fn open_log(file: &Path) -> Result<QueryLog> {
    QueryLog::open(file).map_err(|e| anyhow::anyhow!("could not map file: {}", e))
}

fn progress_for(log: &QueryLog, quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        scan_progress(log.records().len() as u64)
    }
}

fn run_distinct(file: &Path, scan: &ScanArgs, config: &AppConfig) -> Result<()> {
    let log = open_log(file)?;
    let result = log.scan_with_progress(&scan_config(scan, config), progress_for(&log, scan.quiet));
    if !scan.quiet {
        output::print_diagnostics(result.stats());
    }

    output::print_distinct(result.distinct_count(), &output_options(scan, config))?;
    Ok(())
}

fn run_top(file: &Path, count: usize, scan: &ScanArgs, config: &AppConfig) -> Result<()> {
    let log = open_log(file)?;
    let result = log.scan_with_progress(&scan_config(scan, config), progress_for(&log, scan.quiet));
    if !scan.quiet {
        output::print_diagnostics(result.stats());
    }

    let top = result.top_queries(count);
    output::print_top(&top, &output_options(scan, config))?;
    Ok(())
}

fn run_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = get_config_path().context("could not determine the config directory")?;
    if init {
        if path.exists() {
            bail!("config file already exists: {}", path.display());
        }
        config.save_to(&path)?;
        eprintln!("wrote {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
