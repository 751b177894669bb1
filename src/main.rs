//! Attendance Report - command-line attendance dashboard.

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use attendance_report as app;

use app::aggregate::{self, Aggregate, SummaryReport};
use app::client::SummaryClient;
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::display::resolve_display_mode;
use app::export::{self, ExportFormat};
use app::filter::{self, FilterState};
use app::locale::{format_date_short, status_style};
use app::models::{AttendanceRecord, PeriodSelection, PersonRange, ResolvedInterval, Status};
use app::period;

/// Attendance summaries by day, month range, year or employee.
#[derive(Parser)]
#[command(name = "attendance-report")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report for a single day (default: today)
    Day {
        date: Option<NaiveDate>,
        #[command(flatten)]
        options: ReportOptions,
    },
    /// Report for a range of months in one year; a smaller end month rolls into the next year
    Month {
        /// Gregorian year
        year: i32,
        /// First month (1-12)
        from: u32,
        /// Last month (1-12, default: same as first)
        to: Option<u32>,
        #[command(flatten)]
        options: ReportOptions,
    },
    /// Report for a whole year
    Year {
        /// Gregorian year
        year: i32,
        #[command(flatten)]
        options: ReportOptions,
    },
    /// Records of one employee
    Person {
        name: String,
        #[arg(long, value_enum, default_value = "month")]
        range: RangeArg,
        /// YYYY-MM-DD, YYYY-MM or YYYY depending on range (default: current)
        #[arg(long)]
        on: Option<String>,
        #[command(flatten)]
        options: ReportOptions,
    },
}

#[derive(Args)]
struct ReportOptions {
    /// Only these employees (repeatable)
    #[arg(long = "employee")]
    employees: Vec<String>,
    /// Only these statuses: present, leave, not_reported (repeatable)
    #[arg(long = "status", value_parser = parse_status)]
    statuses: Vec<Status>,
    /// Only these departments (repeatable)
    #[arg(long = "department")]
    departments: Vec<String>,
    /// Case-insensitive employee name search
    #[arg(long, default_value = "")]
    search: String,
    /// Write the displayed records to a file
    #[arg(long, value_enum)]
    export: Option<ExportArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    Day,
    Month,
    Year,
}

impl From<RangeArg> for PersonRange {
    fn from(range: RangeArg) -> Self {
        match range {
            RangeArg::Day => PersonRange::Day,
            RangeArg::Month => PersonRange::Month,
            RangeArg::Year => PersonRange::Year,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportArg {
    Csv,
    Xlsx,
    Pdf,
}

impl From<ExportArg> for ExportFormat {
    fn from(format: ExportArg) -> Self {
        match format {
            ExportArg::Csv => ExportFormat::Csv,
            ExportArg::Xlsx => ExportFormat::Xlsx,
            ExportArg::Pdf => ExportFormat::Pdf,
        }
    }
}

fn parse_status(value: &str) -> Result<Status, String> {
    Status::from_code(value).ok_or_else(|| format!("unknown status '{value}'"))
}

impl ReportOptions {
    fn filter_state(&self, interval: &ResolvedInterval) -> FilterState {
        let mut state = FilterState {
            employees: self.employees.iter().cloned().collect(),
            statuses: self.statuses.iter().copied().collect(),
            departments: self.departments.iter().cloned().collect(),
            search_term: self.search.clone(),
            ..FilterState::default()
        };
        state.restrict_to(interval);
        state
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = if cli.dev {
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };
    let load_result = AppConfig::try_load(&config_path);

    let logging = match &load_result {
        ConfigLoadResult::Loaded(config) => config.logging.clone(),
        _ => LoggingConfig::default(),
    };
    let _log_guard = init_logging(&logging);

    tracing::info!("Attendance Report starting...");
    tracing::info!("Config path: {:?}", config_path);

    let config = match load_result {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, using defaults");
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            bail!("invalid config at {}: {e}", config_path.display());
        }
    };

    let theme = resolve_display_mode(&config.display, Local::now().time(), false);
    tracing::debug!("Display theme: {:?}", theme);

    let client = SummaryClient::new(&config.api.url, config.api.timeout_secs).context("Failed to build HTTP client")?;
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(run(cli.command, &client, &config))
}

/// Console output plus an optional daily rolling log file.
fn init_logging(logging: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "attendance-report.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

async fn run(command: Command, client: &SummaryClient, config: &AppConfig) -> anyhow::Result<()> {
    let today = Local::now().date_naive();

    let (selection, records, options, person) = match command {
        Command::Day { date, options } => {
            let selection = PeriodSelection::Day {
                date: date.unwrap_or(today),
            };
            (selection, None, options, None)
        }
        Command::Month {
            year,
            from,
            to,
            options,
        } => {
            let to = to.unwrap_or(from);
            if !(1..=12).contains(&from) || !(1..=12).contains(&to) {
                bail!("months must be between 1 and 12");
            }
            let selection = PeriodSelection::MonthRange {
                year,
                from_month: from - 1,
                to_month: to - 1,
            };
            (selection, None, options, None)
        }
        Command::Year { year, options } => (PeriodSelection::Year { year }, None, options, None),
        Command::Person {
            name,
            range,
            on,
            options,
        } => {
            let range = PersonRange::from(range);
            let reference = on.unwrap_or_else(|| range.reference_for(today));
            let selection = range.selection(&reference)?;
            let records = client.fetch_person(&name, range, &reference).await;
            (selection, Some(records), options, Some(name))
        }
    };

    let interval = period::resolve(&selection)?;
    println!("{}: {}", selection.period_name(), interval.label);

    let records = match records {
        Some(records) => records,
        None => summary_records(client, &interval, config.roster.size()).await,
    };

    let shown = filter::filter(&records, &options.filter_state(&interval));
    let report = aggregate::aggregate(&shown, &interval);
    print_report(&report, interval.is_single_day());

    if let Some(name) = person {
        print_person(&shown, &name);
    }

    if let Some(format) = options.export {
        export_shown(&shown, format.into(), config)?;
    }

    Ok(())
}

/// Fetch day summaries and expand them into anonymous records, dropping oversized days.
async fn summary_records(client: &SummaryClient, interval: &ResolvedInterval, roster_size: usize) -> Vec<AttendanceRecord> {
    let summaries = client.fetch_summaries(interval).await;
    aggregate::check_roster(&summaries, roster_size);
    aggregate::expand_summaries(&summaries, roster_size)
}

fn print_report(report: &Aggregate, single_day: bool) {
    println!();
    for status in Status::ALL {
        let style = status_style(status);
        println!(
            "{:<14} {:>5} / {:<5} {:>3}%",
            style.card_title,
            report.totals.count(status),
            report.totals.total,
            report.totals.percentage(status)
        );
    }

    if single_day {
        println!();
        for status in Status::ALL {
            let names: Vec<&str> = report
                .by_status
                .group(status)
                .iter()
                .map(|n| n.as_deref().unwrap_or("-"))
                .collect();
            if !names.is_empty() && names.iter().any(|n| *n != "-") {
                println!("{}: {}", status_style(status).label, names.join(", "));
            }
        }
    } else if !report.per_day.is_empty() {
        println!();
        for day in &report.per_day {
            println!("{:<20} {}", format_date_short(day.date), aggregate::status_text(day));
        }
    }

    for trend in &report.per_employee_monthly {
        println!();
        println!("{}", trend.employee);
        for month in &trend.months {
            println!("  {:<10} {:>3}% ({}/{})", month.label, month.percentage, month.present, month.total);
        }
    }
}

fn print_person(records: &[AttendanceRecord], name: &str) {
    let stats = aggregate::employee_stats(records, name);
    if stats.record_count == 0 {
        println!();
        println!("ไม่พบข้อมูลของ {name}");
        return;
    }

    println!();
    for record in &stats.recent {
        println!(
            "{:<20} {:<12} {}",
            format_date_short(record.date),
            status_style(record.status).label,
            record.reason.as_deref().unwrap_or("")
        );
    }
}

fn export_shown(records: &[AttendanceRecord], format: ExportFormat, config: &AppConfig) -> anyhow::Result<()> {
    let summary = SummaryReport::from_records(records);
    tracing::info!(
        "Exporting {} records ({} departments)",
        summary.total_records,
        summary.departments.len()
    );

    let dir = config.export.output_dir();
    match export::export_records(records, format, &dir, &config.export.file_prefix) {
        Ok(path) => {
            println!();
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e).context("Export failed")
        }
    }
}
