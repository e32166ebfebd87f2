//! CLI argument definitions for the event-integration tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use tte_model::{EventMode, TimeUnit};

#[derive(Parser)]
#[command(
    name = "tte",
    version,
    about = "Integrate event dates into subject interval data",
    long_about = "Integrate event dates into subject-level interval (episode) data,\n\
                  producing counting-process-format output for time-to-event analysis.\n\n\
                  Supports competing risks, recurring events, proration of cumulative\n\
                  covariates, and elapsed-time generation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split intervals at event dates and write the integrated table.
    Integrate(IntegrateArgs),
}

#[derive(Parser)]
pub struct IntegrateArgs {
    /// CSV file with one row per subject interval.
    #[arg(value_name = "INTERVALS")]
    pub intervals: PathBuf,

    /// CSV file with event dates per subject.
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Output CSV path (default: <INTERVALS stem>_integrated.csv).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Subject identifier column, present in both tables.
    #[arg(long = "id", default_value = "id")]
    pub id: String,

    /// Primary event date column in the event table.
    #[arg(long = "date", default_value = "event_date")]
    pub date: String,

    /// Interval start column.
    #[arg(long = "start", default_value = "start")]
    pub start: String,

    /// Interval stop column.
    #[arg(long = "stop", default_value = "stop")]
    pub stop: String,

    /// Single terminal event per subject, or every recurrence.
    #[arg(long = "mode", value_enum, default_value = "single")]
    pub mode: EventModeArg,

    /// Competing-risk date column; repeat for each risk in priority order.
    #[arg(long = "compete", value_name = "COLUMN")]
    pub compete: Vec<String>,

    /// Name of the generated outcome column.
    #[arg(long = "generate", default_value = "_failure")]
    pub generate: String,

    /// Event-table column to retain on every output row; repeatable.
    #[arg(long = "keep", value_name = "COLUMN")]
    pub keep: Vec<String>,

    /// Cumulative interval column prorated across splits; repeatable.
    #[arg(long = "continuous", value_name = "COLUMN")]
    pub continuous: Vec<String>,

    /// Generate an elapsed-time column with this name.
    #[arg(long = "timegen", value_name = "COLUMN")]
    pub timegen: Option<String>,

    /// Unit for the elapsed-time column.
    #[arg(long = "timeunit", value_enum, default_value = "days")]
    pub timeunit: TimeUnitArg,

    /// Outcome label as CODE=TEXT (e.g. 1=Relapse); repeatable.
    #[arg(long = "label", value_name = "CODE=TEXT", value_parser = parse_label)]
    pub label: Vec<(i64, String)>,

    /// Overwrite existing outcome/time columns in the interval table.
    #[arg(long = "replace")]
    pub replace: bool,

    /// Run the integration and print the summary without writing output.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EventModeArg {
    Single,
    Recurring,
}

impl From<EventModeArg> for EventMode {
    fn from(value: EventModeArg) -> Self {
        match value {
            EventModeArg::Single => EventMode::Single,
            EventModeArg::Recurring => EventMode::Recurring,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TimeUnitArg {
    Days,
    Months,
    Years,
}

impl From<TimeUnitArg> for TimeUnit {
    fn from(value: TimeUnitArg) -> Self {
        match value {
            TimeUnitArg::Days => TimeUnit::Days,
            TimeUnitArg::Months => TimeUnit::Months,
            TimeUnitArg::Years => TimeUnit::Years,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_label(raw: &str) -> Result<(i64, String), String> {
    let (code, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=TEXT, got '{raw}'"))?;
    let code = code
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{code}' is not an outcome code"))?;
    Ok((code, text.trim().to_string()))
}
