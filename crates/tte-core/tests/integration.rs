//! End-to-end tests for the event-integration engine.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};

use tte_core::integrate_events;
use tte_ingest::{any_to_f64, any_to_string};
use tte_model::{EventConfig, EventMode, TimeUnit, TteError};

fn frame(columns: Vec<Column>) -> DataFrame {
    DataFrame::new(columns).expect("build frame")
}

fn col_f64(frame: &DataFrame, name: &str) -> Vec<Option<f64>> {
    let column = frame.column(name).expect("column present");
    (0..frame.height())
        .map(|idx| any_to_f64(column.get(idx).expect("cell")))
        .collect()
}

fn col_str(frame: &DataFrame, name: &str) -> Vec<String> {
    let column = frame.column(name).expect("column present");
    (0..frame.height())
        .map(|idx| any_to_string(column.get(idx).expect("cell")))
        .collect()
}

fn outcomes(frame: &DataFrame, name: &str) -> Vec<i64> {
    col_f64(frame, name)
        .into_iter()
        .map(|value| value.expect("outcome set") as i64)
        .collect()
}

fn full_year_intervals() -> DataFrame {
    frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("start".into(), vec![0.0]),
        Column::new("stop".into(), vec![366.0]),
        Column::new("exp".into(), vec![1i64]),
    ])
}

fn events_at(dates: Vec<Option<f64>>) -> DataFrame {
    let ids: Vec<String> = (0..dates.len()).map(|_| "1".to_string()).collect();
    frame(vec![
        Column::new("id".into(), ids),
        Column::new("event_date".into(), dates),
    ])
}

#[test]
fn event_inside_a_full_year_interval_splits_and_truncates() {
    let events = events_at(vec![Some(136.0)]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.events, 1);
    assert_eq!(outcomes(&output, "_failure"), vec![1]);
    assert_eq!(col_f64(&output, "stop"), vec![Some(136.0)]);
    // Follow-up after the event is gone.
    assert!(
        col_f64(&output, "start")
            .iter()
            .all(|start| start.unwrap() < 136.0)
    );
    // Static covariates are preserved.
    assert_eq!(col_f64(&output, "exp"), vec![Some(1.0)]);
}

#[test]
fn boundary_events_are_never_captured() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1", "1"]),
        Column::new("start".into(), vec![0.0, 181.0]),
        Column::new("stop".into(), vec![181.0, 366.0]),
    ]);
    let config = EventConfig::new("id", "event_date");

    for date in [0.0, 181.0, 366.0] {
        let events = events_at(vec![Some(date)]);
        let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();
        assert_eq!(summary.rows, 2, "date {date} should leave rows unchanged");
        assert_eq!(summary.events, 0);
        assert_eq!(outcomes(&output, "_failure"), vec![0, 0]);
    }
}

#[test]
fn events_outside_follow_up_are_discarded() {
    let config = EventConfig::new("id", "event_date");
    for date in [-10.0, 400.0] {
        let events = events_at(vec![Some(date)]);
        let (output, summary) =
            integrate_events(&full_year_intervals(), &events, &config).unwrap();
        assert_eq!(summary.events, 0);
        assert_eq!(outcomes(&output, "_failure"), vec![0]);
    }
}

#[test]
fn earlier_competing_risk_wins_over_the_primary() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![182.0]),
        Column::new("death_date".into(), vec![91.0]),
    ]);
    let config = EventConfig::new("id", "event_date").with_compete(["death_date"]);

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(summary.events, 1);
    assert_eq!(outcomes(&output, "_failure"), vec![2]);
    assert_eq!(col_f64(&output, "stop"), vec![Some(91.0)]);
}

#[test]
fn earliest_of_several_competing_risks_wins_with_its_listed_code() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![213.0]),
        Column::new("emigration_date".into(), vec![91.0]),
        Column::new("death_date".into(), vec![182.0]),
        Column::new("transplant_date".into(), vec![122.0]),
    ]);
    let config = EventConfig::new("id", "event_date").with_compete([
        "emigration_date",
        "death_date",
        "transplant_date",
    ]);

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(summary.events, 1);
    // First-listed competing risk carries code 2.
    assert_eq!(outcomes(&output, "_failure"), vec![2]);
    assert_eq!(col_f64(&output, "stop"), vec![Some(91.0)]);
}

#[test]
fn later_listed_competing_risk_carries_its_own_code() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![Some(213.0)]),
        Column::new("death_date".into(), vec![Some(182.0)]),
        Column::new("emigration_date".into(), vec![Some(91.0)]),
    ]);
    let config =
        EventConfig::new("id", "event_date").with_compete(["death_date", "emigration_date"]);

    let (output, _) = integrate_events(&full_year_intervals(), &events, &config).unwrap();
    // Second-listed competing risk carries code 3.
    assert_eq!(outcomes(&output, "_failure"), vec![3]);
}

#[test]
fn primary_wins_when_competing_dates_are_missing() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![Some(105.0)]),
        Column::new("death_date".into(), vec![None::<f64>]),
    ]);
    let config = EventConfig::new("id", "event_date").with_compete(["death_date"]);

    let (output, _) = integrate_events(&full_year_intervals(), &events, &config).unwrap();
    assert_eq!(outcomes(&output, "_failure"), vec![1]);
}

#[test]
fn continuous_covariates_are_prorated_across_the_split() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("start".into(), vec![0.0]),
        Column::new("stop".into(), vec![366.0]),
        Column::new("dose".into(), vec![365.0]),
    ]);
    let events = events_at(vec![Some(136.0)]);
    let config = EventConfig::new("id", "event_date")
        .with_mode(EventMode::Recurring)
        .with_continuous(["dose"]);

    let (output, _) = integrate_events(&intervals, &events, &config).unwrap();

    let doses = col_f64(&output, "dose");
    assert_eq!(doses.len(), 2);
    let head = doses[0].unwrap();
    let tail = doses[1].unwrap();
    assert!((head - 365.0 * 136.0 / 366.0).abs() < 1.0);
    assert_eq!(head + tail, 365.0);
}

#[test]
fn recurring_mode_records_every_occurrence_and_conserves_person_time() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1", "1"]),
        Column::new("start".into(), vec![0.0, 181.0]),
        Column::new("stop".into(), vec![181.0, 366.0]),
    ]);
    let events = frame(vec![
        Column::new("id".into(), vec!["1", "1"]),
        Column::new("event_date".into(), vec![74.0, 259.0]),
    ]);
    let config = EventConfig::new("id", "event_date").with_mode(EventMode::Recurring);

    let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.events, 2);
    assert_eq!(outcomes(&output, "_failure"), vec![1, 0, 1, 0]);
    let person_time: f64 = col_f64(&output, "start")
        .iter()
        .zip(col_f64(&output, "stop").iter())
        .map(|(start, stop)| stop.unwrap() - start.unwrap())
        .sum();
    assert_eq!(person_time, 366.0);
}

#[test]
fn recurring_mode_gathers_numbered_occurrence_columns() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("start".into(), vec![0.0]),
        Column::new("stop".into(), vec![366.0]),
    ]);
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("relapse1".into(), vec![Some(50.0)]),
        Column::new("relapse2".into(), vec![Some(120.0)]),
        Column::new("relapse3".into(), vec![None::<f64>]),
    ]);
    let config = EventConfig::new("id", "relapse").with_mode(EventMode::Recurring);

    let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(summary.events, 2);
    assert_eq!(outcomes(&output, "_failure"), vec![1, 1, 0]);
    assert_eq!(
        col_f64(&output, "stop"),
        vec![Some(50.0), Some(120.0), Some(366.0)]
    );
}

#[test]
fn single_mode_flags_at_most_one_event_per_subject() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1", "1"]),
        Column::new("event_date".into(), vec![74.0, 259.0]),
    ]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(summary.events, 1);
    assert_eq!(outcomes(&output, "_failure"), vec![1]);
    assert_eq!(col_f64(&output, "stop"), vec![Some(74.0)]);
}

#[test]
fn empty_event_table_censors_everything() {
    let events = frame(vec![
        Column::new("id".into(), Vec::<String>::new()),
        Column::new("event_date".into(), Vec::<f64>::new()),
    ]);
    let config = EventConfig::new("id", "event_date").with_timegen("followup", TimeUnit::Days);

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.events, 0);
    assert_eq!(summary.censored_rows(), 1);
    assert_eq!(outcomes(&output, "_failure"), vec![0]);
    assert_eq!(col_f64(&output, "followup"), vec![None]);
}

#[test]
fn unmatched_event_subjects_have_no_effect() {
    let events = frame(vec![
        Column::new("id".into(), vec!["99"]),
        Column::new("event_date".into(), vec![136.0]),
    ]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();
    assert_eq!(summary.events, 0);
    assert_eq!(outcomes(&output, "_failure"), vec![0]);
}

#[test]
fn elapsed_time_is_measured_from_entry_in_the_requested_unit() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1", "1"]),
        Column::new("start".into(), vec![100.0, 200.0]),
        Column::new("stop".into(), vec![200.0, 500.0]),
    ]);
    let events = events_at(vec![Some(465.25)]);
    let config = EventConfig::new("id", "event_date").with_timegen("followup", TimeUnit::Years);

    let (output, _) = integrate_events(&intervals, &events, &config).unwrap();

    let followup = col_f64(&output, "followup");
    // Censored rows stay missing; the event row measures from day 100.
    assert_eq!(followup, vec![None, Some(1.0)]);
}

#[test]
fn retained_columns_and_labels_are_attached() {
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![136.0]),
        Column::new("severity".into(), vec!["high"]),
    ]);
    let labels: BTreeMap<i64, String> = [
        (0, "Censored".to_string()),
        (1, "Relapse".to_string()),
    ]
    .into_iter()
    .collect();
    let config = EventConfig::new("id", "event_date")
        .with_mode(EventMode::Recurring)
        .with_keepvars(["severity"])
        .with_labels(labels);

    let (output, _) = integrate_events(&full_year_intervals(), &events, &config).unwrap();

    assert_eq!(col_str(&output, "severity"), vec!["high", "high"]);
    assert_eq!(col_str(&output, "_failure_label"), vec!["Relapse", "Censored"]);
}

#[test]
fn existing_outcome_column_is_replaced_only_with_permission() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("start".into(), vec![0.0]),
        Column::new("stop".into(), vec![366.0]),
        Column::new("_failure".into(), vec![9i64]),
    ]);
    let events = events_at(vec![Some(136.0)]);

    let config = EventConfig::new("id", "event_date");
    let error = integrate_events(&intervals, &events, &config).unwrap_err();
    assert!(matches!(error, TteError::ColumnExists { .. }));

    let config = EventConfig::new("id", "event_date").with_replace(true);
    let (output, _) = integrate_events(&intervals, &events, &config).unwrap();
    assert_eq!(outcomes(&output, "_failure"), vec![1]);
}

#[test]
fn custom_boundary_and_outcome_names_are_respected() {
    let intervals = frame(vec![
        Column::new("person_id".into(), vec!["1"]),
        Column::new("period_begin".into(), vec![0.0]),
        Column::new("period_end".into(), vec![366.0]),
    ]);
    let events = frame(vec![
        Column::new("person_id".into(), vec!["1"]),
        Column::new("event_date".into(), vec![136.0]),
    ]);
    let config = EventConfig::new("person_id", "event_date")
        .with_boundaries("period_begin", "period_end")
        .with_generate("outcome");

    let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(summary.outcome_column, "outcome");
    assert_eq!(outcomes(&output, "outcome"), vec![1]);
    assert_eq!(col_f64(&output, "period_end"), vec![Some(136.0)]);
    assert!(output.column("start").is_err());
}

#[test]
fn iso_dates_work_end_to_end() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("start".into(), vec!["2020-01-01"]),
        Column::new("stop".into(), vec!["2020-12-31"]),
    ]);
    let events = frame(vec![
        Column::new("id".into(), vec!["1"]),
        Column::new("event_date".into(), vec!["2020-06-15"]),
    ]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(summary.events, 1);
    // 2020-06-15 is day 18428 since 1970-01-01.
    assert_eq!(col_f64(&output, "stop"), vec![Some(18428.0)]);
}

#[test]
fn events_stay_with_their_own_subject() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1", "2", "3"]),
        Column::new("start".into(), vec![0.0, 0.0, 0.0]),
        Column::new("stop".into(), vec![366.0, 366.0, 366.0]),
    ]);
    let events = frame(vec![
        Column::new("id".into(), vec!["1", "2"]),
        Column::new("event_date".into(), vec![105.0, 263.0]),
    ]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(summary.events, 2);
    assert_eq!(col_str(&output, "id"), vec!["1", "2", "3"]);
    assert_eq!(outcomes(&output, "_failure"), vec![1, 1, 0]);
}

#[test]
fn output_rows_are_ordered_by_subject_then_start() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["10", "2", "2"]),
        Column::new("start".into(), vec![0.0, 100.0, 0.0]),
        Column::new("stop".into(), vec![50.0, 200.0, 100.0]),
    ]);
    let events = frame(vec![
        Column::new("id".into(), vec!["2"]),
        Column::new("event_date".into(), vec![150.0]),
    ]);
    let config = EventConfig::new("id", "event_date");

    let (output, _) = integrate_events(&intervals, &events, &config).unwrap();

    assert_eq!(col_str(&output, "id"), vec!["2", "2", "10"]);
    let starts = col_f64(&output, "start");
    assert_eq!(starts, vec![Some(0.0), Some(100.0), Some(0.0)]);
}

#[test]
fn malformed_interval_aborts_the_whole_run() {
    let intervals = frame(vec![
        Column::new("id".into(), vec!["1", "2"]),
        Column::new("start".into(), vec![0.0, 50.0]),
        Column::new("stop".into(), vec![366.0, 40.0]),
    ]);
    let events = events_at(vec![Some(136.0)]);
    let config = EventConfig::new("id", "event_date");

    let error = integrate_events(&intervals, &events, &config).unwrap_err();
    match error {
        TteError::DataIntegrity { subject, .. } => assert_eq!(subject, "2"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn all_missing_event_dates_censor_the_subject() {
    let events = events_at(vec![None, None]);
    let config = EventConfig::new("id", "event_date");

    let (output, summary) = integrate_events(&full_year_intervals(), &events, &config).unwrap();
    assert_eq!(summary.events, 0);
    assert_eq!(outcomes(&output, "_failure"), vec![0]);
}
