//! Attendance Report - resolve a date range, run the report and export it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use attendance_report as app;
use chrono::Local;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::export::{CSV_MIME_TYPE, export_csv, export_filename, export_xlsx};
use app::models::StatusFilter;
use app::range::{QuickRangeToken, parse_flexible_date, resolve_input};
use app::report::{ReportEngine, ReportQuery, summarize};
use app::session::ReportSession;

/// Attendance report generator and CSV exporter.
#[derive(Parser)]
#[command(name = "attendance-report")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Range: today, yesterday, last_7_days, last_30_days, this_month, last_month, custom
    #[arg(long, default_value = "today")]
    range: String,

    /// Custom range start (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Custom range end (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Status filter: All, Present, Late, Absent
    #[arg(long, default_value = "All")]
    status: String,

    /// Date the range is resolved against (defaults to today)
    #[arg(long)]
    reference_date: Option<String>,

    /// Output file (defaults to a generated name in the configured output dir)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write an Excel workbook next to the CSV
    #[arg(long)]
    xlsx: bool,

    /// Only print status counts, do not export
    #[arg(long)]
    summary: bool,
}

/// Where the configuration came from.
enum ConfigSource {
    File(PathBuf),
    Defaults,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config first so logging can honour its settings
    let (config, config_source) = load_config(&cli)?;
    let _log_guard = init_logging(&config.logging);

    tracing::info!("Attendance Report starting...");
    match &config_source {
        ConfigSource::File(path) => tracing::info!("Config loaded from {:?}", path),
        ConfigSource::Defaults => tracing::info!("No config file found, using defaults"),
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let reference_date = match &cli.reference_date {
        Some(text) => parse_flexible_date(text).with_context(|| format!("Invalid reference date '{text}'"))?,
        None => today,
    };

    let token: QuickRangeToken = cli.range.parse()?;
    let status: StatusFilter = cli.status.parse()?;
    let range = resolve_input(token, cli.from.as_deref(), cli.to.as_deref(), reference_date)?;
    let query = ReportQuery::new(range, status);
    tracing::info!("Resolved {token} against {reference_date} to {range}");

    let (source, directory) = config.source.build()?;
    let mut engine = ReportEngine::new(source, config.policy.to_policy()?);
    if config.report.synthesize_absent {
        engine = engine.with_absence_roster(directory, reference_date);
    }

    let mut session = ReportSession::new(engine, tokio::runtime::Handle::current());
    session.submit(query);
    let outcome = session
        .next_outcome()
        .await
        .context("Report task ended without a result")?;
    let records = outcome.result?;

    let summary = summarize(&records);
    tracing::info!("{}", summary.message());
    if cli.summary {
        println!("{}", summary.message());
        return Ok(());
    }

    let csv_path = match cli.output {
        Some(path) => path,
        None => config.report.output_dir.join(export_filename(token, status, today)),
    };
    write_csv(&csv_path, &export_csv(&records)?)?;
    println!("{} ({CSV_MIME_TYPE}, {} rows)", csv_path.display(), records.len());

    if cli.xlsx {
        let xlsx_path = csv_path.with_extension("xlsx");
        export_xlsx(&records, &xlsx_path)?;
        println!("{}", xlsx_path.display());
    }

    Ok(())
}

fn write_csv(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load config from the first location that has one.
///
/// An invalid file is an error; defaults are only used when no file exists.
fn load_config(cli: &Cli) -> anyhow::Result<(AppConfig, ConfigSource)> {
    let candidates: Vec<PathBuf> = if let Some(path) = &cli.config {
        vec![path.clone()]
    } else if cli.dev {
        vec![PathBuf::from("config.toml")]
    } else {
        std::iter::once(AppConfig::default_path())
            .chain(AppConfig::user_path())
            .collect()
    };

    for path in candidates {
        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(config) => return Ok((config, ConfigSource::File(path))),
            ConfigLoadResult::Missing => continue,
            ConfigLoadResult::Invalid(e) => {
                return Err(anyhow::Error::new(e).context(format!("Invalid config {}", path.display())));
            }
        }
    }

    Ok((AppConfig::default(), ConfigSource::Defaults))
}

/// Initialize logging, to a daily rolling file when a directory is configured.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "attendance-report.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
