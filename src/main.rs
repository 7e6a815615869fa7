mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use thiserror::Error;

use crate::input::local::{DEFAULT_LOCAL_PATH, LocalSource};
use crate::input::remote::{GraphConfig, GraphSource, RemoteSource};
use crate::input::ttl::DEFAULT_TTL;
use crate::input::{DatasetCache, Resolution, Resolver};
use crate::pipeline::stage3_filter::{FilterState, Selection, apply_filters, filter_options};
use crate::pipeline::stage5_report::{ExportFormat, Stage5Input, write_reports};
use crate::report::ExportError;
use crate::report::text::render_report_text;

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("no data available: {0}")]
    NoData(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Parser)]
#[command(
    name = "synvia-elnqc",
    version,
    about = "Quality-control report for bioequivalence study batches"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the dataset, apply filters, write summary and exports.
    Report(ReportArgs),
    /// List the values accepted by the company/year/study filters.
    Options(OptionsArgs),
    /// Re-render the report periodically through the dataset cache.
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
struct SourceArgs {
    /// Local fallback file (`.gz` accepted).
    #[arg(long, env = "ELNQC_LOCAL_PATH", default_value = DEFAULT_LOCAL_PATH)]
    local: PathBuf,

    #[arg(long, env = "GRAPH_TENANT_ID")]
    graph_tenant_id: Option<String>,

    #[arg(long, env = "GRAPH_CLIENT_ID")]
    graph_client_id: Option<String>,

    #[arg(long, env = "GRAPH_CLIENT_SECRET", hide_env_values = true)]
    graph_client_secret: Option<String>,

    #[arg(long, env = "GRAPH_USER_UPN")]
    graph_user_upn: Option<String>,

    /// Document path inside the user's drive.
    #[arg(long, env = "GRAPH_FILE_PATH")]
    graph_file_path: Option<String>,

    /// Skip the remote store even when credentials are configured.
    #[arg(long)]
    no_remote: bool,

    /// Dataset cache lifetime in seconds.
    #[arg(long, env = "ELNQC_TTL_SECS", default_value_t = DEFAULT_TTL.as_secs())]
    ttl_secs: u64,
}

#[derive(Debug, Clone, Args)]
struct FilterArgs {
    /// Company display name, or "all".
    #[arg(long)]
    company: Option<String>,

    /// Four-digit study year, or "all".
    #[arg(long)]
    year: Option<String>,

    /// Study code, or "all".
    #[arg(long)]
    study: Option<String>,

    /// Keep rows whose completeness is at least this percentage.
    #[arg(long, default_value_t = 0.0)]
    min_completeness: f64,

    /// Keep only studies with approval < 70% or completeness < 80%.
    #[arg(long)]
    critical_only: bool,
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    filters: FilterArgs,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Both)]
    format: ExportFormat,
}

#[derive(Debug, Clone, Args)]
struct OptionsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Restrict the study list to one company.
    #[arg(long)]
    company: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct WatchArgs {
    #[command(flatten)]
    report: ReportArgs,

    /// Seconds between renders.
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Number of renders before exiting.
    #[arg(long, default_value_t = 5)]
    iterations: u32,

    /// Drop the cached dataset before every render.
    #[arg(long)]
    refresh: bool,
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Report(args) => {
            let cache = build_cache(&args.source);
            run_report(&args, &cache)
        }
        Command::Options(args) => {
            let cache = build_cache(&args.source);
            let resolution = usable(cache.get())?;
            let company = Selection::parse(args.company.as_deref());
            let options = filter_options(resolution.dataset.records(), &company);
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(())
        }
        Command::Watch(args) => {
            let cache = build_cache(&args.report.source);
            tracing::info!(
                interval_secs = args.interval,
                ttl_secs = cache.ttl().as_secs(),
                "watching dataset"
            );
            for round in 1..=args.iterations {
                tracing::info!(round, of = args.iterations, "rendering report");
                if args.refresh {
                    cache.invalidate();
                }
                run_report(&args.report, &cache)?;
                if round < args.iterations {
                    std::thread::sleep(Duration::from_secs(args.interval));
                }
            }
            Ok(())
        }
    }
}

fn run_report(args: &ReportArgs, cache: &DatasetCache<Resolver>) -> Result<(), AppError> {
    let filters = filter_state(&args.filters)?;
    let resolution = usable(cache.get())?;
    let filtered = apply_filters(resolution.dataset.records(), &filters);

    let input = Stage5Input {
        resolution: &resolution,
        filters: &filters,
        filtered: &filtered,
        generated_at: chrono::Local::now().naive_local(),
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let (summary, artifacts) = write_reports(&input, &args.out, args.format)?;
    tracing::info!(
        summary = %artifacts.summary_json.display(),
        report = %artifacts.report_txt.display(),
        workbook = artifacts.workbook.is_some(),
        csv = artifacts.delimited.is_some(),
        "reports written"
    );
    print!("{}", render_report_text(&summary));
    Ok(())
}

fn build_cache(args: &SourceArgs) -> DatasetCache<Resolver> {
    let local = LocalSource::new(&args.local);
    let remote = if args.no_remote {
        None
    } else {
        build_remote(args)
    };
    let resolver = match remote {
        Some(remote) => Resolver::new(Some(remote), local),
        None => Resolver::local_only(local),
    };
    DatasetCache::new(resolver, Duration::from_secs(args.ttl_secs))
}

fn build_remote(args: &SourceArgs) -> Option<Box<dyn RemoteSource>> {
    let Some(config) = GraphConfig::from_parts(
        args.graph_tenant_id.clone(),
        args.graph_client_id.clone(),
        args.graph_client_secret.clone(),
        args.graph_user_upn.clone(),
        args.graph_file_path.clone(),
    ) else {
        tracing::debug!("remote credentials incomplete");
        return None;
    };
    match GraphSource::new(config) {
        Ok(source) => Some(Box::new(source)),
        Err(err) => {
            tracing::warn!("remote client could not be built, reading local file only: {err}");
            None
        }
    }
}

fn usable(resolution: std::sync::Arc<Resolution>) -> Result<std::sync::Arc<Resolution>, AppError> {
    if resolution.is_usable() {
        return Ok(resolution);
    }
    let reason = match &resolution.error {
        Some(err) => err.to_string(),
        None => "the source file contains no rows".to_string(),
    };
    Err(AppError::NoData(reason))
}

fn filter_state(args: &FilterArgs) -> Result<FilterState, AppError> {
    if !(0.0..=100.0).contains(&args.min_completeness) {
        return Err(AppError::InvalidArgument(format!(
            "--min-completeness must be between 0 and 100, got {}",
            args.min_completeness
        )));
    }
    Ok(FilterState {
        company: Selection::parse(args.company.as_deref()),
        year: Selection::parse(args.year.as_deref()),
        study: Selection::parse(args.study.as_deref()),
        min_completeness: args.min_completeness,
        critical_only: args.critical_only,
    })
}
