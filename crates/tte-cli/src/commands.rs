use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use tte_core::integrate_events;
use tte_ingest::{read_csv_frame, write_csv_frame};
use tte_model::EventConfig;

use crate::cli::IntegrateArgs;
use crate::types::RunOutcome;

pub fn run_integrate(args: &IntegrateArgs) -> Result<RunOutcome> {
    let span = info_span!("integrate", intervals = %args.intervals.display());
    let _guard = span.enter();
    let start = Instant::now();

    let intervals = read_csv_frame(&args.intervals)
        .with_context(|| format!("read intervals from {}", args.intervals.display()))?;
    let events = read_csv_frame(&args.events)
        .with_context(|| format!("read events from {}", args.events.display()))?;

    let config = build_config(args);
    let (frame, summary) = integrate_events(&intervals, &events, &config)?;

    let output = if args.dry_run {
        info!("dry run, skipping output");
        None
    } else {
        let path = output_path(args);
        write_csv_frame(&frame, &path)
            .with_context(|| format!("write output to {}", path.display()))?;
        info!(
            output = %path.display(),
            rows = summary.rows,
            duration_ms = start.elapsed().as_millis(),
            "output written"
        );
        Some(path)
    };

    Ok(RunOutcome {
        summary,
        labels: config.labels,
        output,
    })
}

fn build_config(args: &IntegrateArgs) -> EventConfig {
    let labels: BTreeMap<i64, String> = args.label.iter().cloned().collect();
    let mut config = EventConfig::new(&args.id, &args.date)
        .with_mode(args.mode.into())
        .with_boundaries(&args.start, &args.stop)
        .with_compete(args.compete.iter().map(String::as_str))
        .with_generate(&args.generate)
        .with_keepvars(args.keep.iter().map(String::as_str))
        .with_continuous(args.continuous.iter().map(String::as_str))
        .with_labels(labels)
        .with_replace(args.replace);
    if let Some(timegen) = &args.timegen {
        config = config.with_timegen(timegen, args.timeunit.into());
    }
    config
}

fn output_path(args: &IntegrateArgs) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    let stem = args
        .intervals
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("intervals");
    args.intervals
        .with_file_name(format!("{stem}_integrated.csv"))
}
