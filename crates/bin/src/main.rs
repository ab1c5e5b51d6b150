//! Factorscope CLI binary.
//!
//! Provides a command-line interface for exploring factor return series.

mod render;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use factorscope::catalog::{display_name, group_name, rank_name};
use factorscope::{AnalysisRequest, FactorSelection, analyze};
use factorscope_data::{FactorStore, StoreConfig};
use factorscope_output::ExportFormat;
use indicatif::{ProgressBar, ProgressStyle};
use render::Style;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "factorscope")]
#[command(about = "Factorscope: performance and risk analytics for equity factor portfolios", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the factor portfolio CSV files
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Market portfolio file name inside the data directory
    #[arg(long, global = true, default_value = "portf_me_monthly_2023.csv")]
    market_file: String,

    /// Treat returns in the files as fractions instead of percentages
    #[arg(long, global = true)]
    fractional_returns: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List groups, factors and their available ranks
    List {
        /// Only show one group
        #[arg(long)]
        group: Option<String>,
    },

    /// Analyze one or more factors against the market portfolio
    Analyze {
        /// Factor as group/factor[:rank_col=value,...]; repeat for a multifactor blend
        #[arg(long = "factor", required = true)]
        factors: Vec<FactorSelection>,

        /// Market-cap rank shared by every factor
        #[arg(long)]
        market_cap: Option<i64>,

        /// Market portfolio rank (defaults to --market-cap)
        #[arg(long)]
        market_rank: Option<i64>,

        /// Return column
        #[arg(long, default_value = factorscope::DEFAULT_RETURN_COLUMN)]
        return_col: String,

        /// Rolling window in months
        #[arg(long, default_value = "12")]
        window: usize,

        /// Blend weight as group/factor=weight; repeat per factor
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,

        /// First month to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last month to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Series for the detailed analysis (id or display name)
        #[arg(long)]
        focus: Option<String>,

        /// Number of quantile buckets for the focus series
        #[arg(long)]
        quantiles: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write every table of the report into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        /// File format for --export (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        export_format: ExportFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (id, weight) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected group/factor=weight, got `{s}`"))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight `{weight}`: {e}"))?;
    Ok((id.trim().to_string(), weight))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig {
        base_path: cli.data_dir,
        market_file: cli.market_file,
        returns_in_percent: !cli.fractional_returns,
    };

    match cli.command {
        Commands::List { group } => {
            let store = open_store(config)?;
            list_factors(&store, group.as_deref())?;
        }
        Commands::Analyze {
            factors,
            market_cap,
            market_rank,
            return_col,
            window,
            weights,
            start,
            end,
            focus,
            quantiles,
            format,
            export,
            export_format,
        } => {
            let request = AnalysisRequest {
                factors,
                market_cap,
                market_rank,
                return_column: return_col,
                window,
                start,
                end,
                weights: (!weights.is_empty())
                    .then(|| weights.into_iter().collect::<BTreeMap<_, _>>()),
                focus,
                quantiles,
            };

            tracing::debug!(
                factors = request.factors.len(),
                window = request.window,
                return_column = %request.return_column,
                "analysis request"
            );

            let store = open_store(config)?;
            let report = analyze(&store, &request)?;

            match format {
                OutputFormat::Text => print!("{}", render::report(&report, Style::Text)),
                OutputFormat::Markdown => print!("{}", render::report(&report, Style::Markdown)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }

            if let Some(dir) = export {
                let files = report.export_to_dir(&dir, export_format)?;
                eprintln!("Exported {} files to {}", files.len(), dir.display());
            }
        }
    }

    Ok(())
}

fn open_store(config: StoreConfig) -> Result<FactorStore, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message("Loading factor files...");

    let store = FactorStore::open_with_progress(config, |progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.index as u64 + 1);
    });

    match &store {
        Ok(store) => pb.finish_with_message(format!("Loaded {} groups", store.groups().len())),
        Err(_) => pb.finish_with_message("Failed!"),
    }
    Ok(store?)
}

fn list_factors(
    store: &FactorStore,
    only: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let groups: Vec<&str> = match only {
        Some(group) => {
            store.factors(group)?;
            vec![group]
        }
        None => store.groups(),
    };

    println!(
        "Market portfolio: {}",
        if store.has_market() { "available" } else { "not found" }
    );

    for group in groups {
        println!("\n{} ({group})", group_name(group));
        println!("{}", "=".repeat(group_name(group).len() + group.len() + 3));

        for factor in store.factors(group)? {
            let id = format!("{group}/{factor}");
            println!("  {:<24} {}", id, display_name(&id));

            let caps = store.market_caps(group, factor)?;
            if !caps.is_empty() {
                println!("  {:<24}   {}: {:?}", "", rank_name("rank_ME"), caps);
            }
            for (column, values) in store.factor_ranks(group, factor)? {
                println!("  {:<24}   {}: {:?}", "", rank_name(&column), values);
            }
        }
    }

    Ok(())
}
