#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{FailingSource, VecSource};
use recdiff_core::{
    AbortReason, Change, DiffEvent, DiffOptions, DiffOutcome, DiffResult, Differ, DifferConfig,
    ExErrorKind, NoopObserver, Record, RecordKey, RecordingObserver, RunContext, RunId, Selection,
};
use serde_json::json;
use std::sync::Arc;

fn differ(config: DifferConfig) -> Differ {
    Differ::new(config)
        .unwrap()
        .with_observer(Arc::new(NoopObserver))
}

fn complete(outcome: DiffOutcome) -> DiffResult {
    match outcome {
        DiffOutcome::Complete(result) => result,
        DiffOutcome::Aborted(reason) => panic!("unexpected abort: {}", reason),
    }
}

fn material(id: &str, energy: f64, formula: &str) -> Record {
    Record::new()
        .with("task_id", id)
        .with("energy", energy)
        .with("formula", formula)
}

fn materials_config() -> DifferConfig {
    DifferConfig::new("task_id")
        .with_props(["formula"])
        .with_delta("energy", "+-0.1")
        .unwrap()
}

fn keys(records: &[recdiff_core::KeyedRecord]) -> Vec<String> {
    records.iter().map(|r| r.key.to_string()).collect()
}

#[test]
fn test_disjoint_keys_are_missing_and_additional() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X"), material("b", 1.0, "X")]);
    let new = VecSource::new("new", vec![material("c", 1.0, "X")]);

    let result = complete(
        differ(materials_config())
            .diff(&old, &new, DiffOptions::default())
            .unwrap(),
    );

    assert_eq!(keys(&result.missing), vec!["a", "b"]);
    assert_eq!(keys(result.additional.as_ref().unwrap()), vec!["c"]);
    assert!(result.different.is_empty());
}

#[test]
fn test_identical_records_produce_no_changes() {
    let records = vec![material("a", -3.2, "Fe2O3"), material("b", 0.0, "NaCl")];
    let old = VecSource::new("old", records.clone());
    let new = VecSource::new("new", records);

    let config = materials_config()
        .with_props(["formula", "task_id"])
        .with_delta("energy", "+-")
        .unwrap();
    let result = complete(differ(config).diff(&old, &new, DiffOptions::default()).unwrap());

    assert!(result.is_empty());
}

#[test]
fn test_exact_change_yields_single_record() {
    let config = DifferConfig::new("task_id").with_props(["formula", "spacegroup"]);
    let old = VecSource::new(
        "old",
        vec![material("a", 1.0, "NaCl").with("spacegroup", 225)],
    );
    let new = VecSource::new(
        "new",
        vec![material("a", 1.0, "NaCl").with("spacegroup", 221)],
    );

    let result = complete(differ(config).diff(&old, &new, DiffOptions::default()).unwrap());

    assert_eq!(result.different.len(), 1);
    match &result.different[0].change {
        Change::Exact { old, new } => {
            assert_eq!(old[1], ("spacegroup".to_string(), "225".to_string()));
            assert_eq!(new[1], ("spacegroup".to_string(), "221".to_string()));
        }
        other => panic!("expected exact change, got {:?}", other),
    }
}

#[test]
fn test_delta_change_output_shape() {
    let old = VecSource::new("old", vec![material("mp-1", -1.0, "X")]);
    let new = VecSource::new("new", vec![material("mp-1", -0.5, "X")]);

    let result = complete(
        differ(materials_config())
            .diff(&old, &new, DiffOptions::default())
            .unwrap(),
    );

    assert_eq!(
        result.to_value(),
        json!({
            "missing": [],
            "additional": [],
            "different": [{
                "match_type": "delta",
                "task_id": "mp-1",
                "property": "energy",
                "old": "-1.000000",
                "new": "-0.500000",
                "rule": "+-0.1"
            }]
        })
    );
}

#[test]
fn test_numeric_compare_requires_both_sides() {
    let old = VecSource::new(
        "old",
        vec![material("a", 1.0, "X"), material("b", 1.0, "X")],
    );
    // "b" lacks energy in the new source: no delta comparison for it
    let new = VecSource::new(
        "new",
        vec![
            material("a", 1.0, "X"),
            Record::new().with("task_id", "b").with("formula", "X"),
        ],
    );

    let result = complete(
        differ(materials_config())
            .diff(&old, &new, DiffOptions::default())
            .unwrap(),
    );

    assert!(result.different.is_empty());
}

#[test]
fn test_numeric_strings_are_coerced() {
    let old = VecSource::from_values("old", vec![json!({"task_id": 1, "energy": "10"})]);
    let new = VecSource::from_values("new", vec![json!({"task_id": 1, "energy": 16})]);
    let config = DifferConfig::new("task_id").with_delta("energy", "+-5").unwrap();

    let result = complete(differ(config).diff(&old, &new, DiffOptions::default()).unwrap());

    assert_eq!(result.different.len(), 1);
    assert_eq!(result.different[0].key, RecordKey::from(1));
}

#[test]
fn test_duplicate_key_is_integrity_error() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X"), material("a", 2.0, "Y")]);
    let new = VecSource::new("new", vec![]);

    let err = differ(materials_config())
        .diff(&old, &new, DiffOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::DuplicateKey);
    assert_eq!(err.source_name(), Some("old"));
    assert!(err.message().contains("Duplicate key: a"));
    assert!(err.run_id().is_some());
}

#[test]
fn test_allowed_duplicates_last_write_wins() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X")]);
    let new = VecSource::new(
        "new",
        vec![material("a", 50.0, "Y"), material("a", 1.0, "X")],
    );

    let result = complete(
        differ(materials_config())
            .diff(&old, &new, DiffOptions::default().allow_duplicates(true))
            .unwrap(),
    );

    assert!(result.different.is_empty());
}

#[test]
fn test_not_a_number_is_integrity_error() {
    let old = VecSource::from_values(
        "old",
        vec![json!({"task_id": "a", "energy": "n/a", "formula": "X"})],
    );
    let new = VecSource::new("new", vec![]);

    let err = differ(materials_config())
        .diff(&old, &new, DiffOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotANumber);
    assert_eq!(
        err.message(),
        "Not a number: source=old key=a energy='n/a'"
    );
}

#[test]
fn test_missing_key_field_aborts_without_partial_result() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X")]);
    let new = VecSource::new(
        "new",
        vec![
            material("a", 1.0, "X"),
            Record::new().with("energy", 2.0).with("formula", "X"),
        ],
    );

    let outcome = differ(materials_config())
        .diff(&old, &new, DiffOptions::default())
        .unwrap();

    assert_eq!(
        outcome,
        DiffOutcome::Aborted(AbortReason::MissingKeyField {
            source: "new".to_string(),
            key_field: "task_id".to_string(),
            record_index: 1,
        })
    );
    assert_eq!(outcome.to_value(), json!({}));
}

#[test]
fn test_all_properties_missing_aborts() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X")]);
    let new = VecSource::new(
        "new",
        vec![Record::new().with("task_id", "a"), Record::new().with("task_id", "b")],
    );

    let outcome = differ(materials_config())
        .diff(&old, &new, DiffOptions::default())
        .unwrap();

    assert!(matches!(
        outcome.abort_reason(),
        Some(AbortReason::PropertiesUnavailable { records: 2, .. })
    ));
}

#[test]
fn test_partial_properties_warns_and_continues() {
    let observer = Arc::new(RecordingObserver::new());
    let d = Differ::new(materials_config())
        .unwrap()
        .with_observer(observer.clone());
    let old = VecSource::new(
        "old",
        vec![material("a", 1.0, "X"), Record::new().with("task_id", "b")],
    );
    let new = VecSource::new("new", vec![material("a", 1.0, "X")]);

    let result = complete(d.diff(&old, &new, DiffOptions::default()).unwrap());

    assert_eq!(keys(&result.missing), vec!["b"]);
    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        DiffEvent::PartialProperties { source, missing_props: 1, records: 2 } if source == "old"
    ));
}

#[test]
fn test_observer_sees_run_lifecycle() {
    let observer = Arc::new(RecordingObserver::new());
    let d = Differ::new(materials_config())
        .unwrap()
        .with_observer(observer.clone());
    let old = VecSource::new("old", vec![material("a", 1.0, "X")]);
    let new = VecSource::new("new", vec![material("a", 2.0, "X")]);

    complete(d.diff(&old, &new, DiffOptions::default()).unwrap());

    let events = observer.events();
    assert!(matches!(events.first(), Some(DiffEvent::Started { .. })));
    let scanned = events
        .iter()
        .filter(|e| matches!(e, DiffEvent::SourceScanned { .. }))
        .count();
    assert_eq!(scanned, 2);
    assert!(matches!(
        events.last(),
        Some(DiffEvent::Finished {
            missing: 0,
            additional: Some(0),
            different: 1,
            ..
        })
    ));
}

#[test]
fn test_info_fields_attached_and_overridden_by_new() {
    let config = materials_config().with_info(["label"]);
    let old = VecSource::new(
        "old",
        vec![
            material("a", 1.0, "X").with("label", "before"),
            material("gone", 1.0, "X").with("label", "old only"),
        ],
    );
    let new = VecSource::new(
        "new",
        vec![material("a", 9.0, "X").with("label", "after")],
    );

    let result = complete(differ(config).diff(&old, &new, DiffOptions::default()).unwrap());

    assert_eq!(result.missing[0].info["label"], json!("old only"));
    assert_eq!(result.different[0].info["label"], json!("after"));
    assert_eq!(result.to_value()["different"][0]["label"], json!("after"));
}

#[test]
fn test_selection_and_projection_forwarded() {
    let config = materials_config()
        .with_info(["label"])
        .with_filter(Selection::new(json!({"state": "successful"})));
    let old = VecSource::new("old", vec![]);
    let new = VecSource::new("new", vec![]);

    differ(config).diff(&old, &new, DiffOptions::default()).unwrap();

    let (selection, projection) = old.last_query().unwrap();
    assert_eq!(selection.as_value(), &json!({"state": "successful"}));
    let fields: Vec<&str> = projection.fields().collect();
    assert_eq!(fields, vec!["energy", "formula", "label", "task_id"]);
    assert!(!projection.includes("_id"));
    assert!(new.last_query().is_some());
}

#[test]
fn test_only_missing_mode() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X"), material("b", 1.0, "X")]);
    let new = VecSource::new("new", vec![material("a", 5.0, "Y"), material("c", 1.0, "X")]);

    let result = complete(
        differ(materials_config())
            .diff(&old, &new, DiffOptions::default().only_missing(true))
            .unwrap(),
    );

    assert_eq!(keys(&result.missing), vec!["b"]);
    assert!(result.additional.is_none());
    assert!(result.to_value().get("additional").is_none());

    assert_eq!(result.different.len(), 2);
    assert!(result.different.iter().all(|r| r.key.to_string() == "a"));
    assert!(matches!(result.different[0].change, Change::Delta { .. }));
    assert!(matches!(result.different[1].change, Change::Exact { .. }));
}

#[test]
fn test_only_missing_reports_same_changes_as_full_diff() {
    let old = VecSource::new("old", vec![material("a", 1.0, "X"), material("b", 1.0, "X")]);
    let new = VecSource::new("new", vec![material("a", 5.0, "Y")]);
    let d = differ(materials_config());

    let full = complete(d.diff(&old, &new, DiffOptions::default()).unwrap());
    let partial = complete(
        d.diff(&old, &new, DiffOptions::default().only_missing(true))
            .unwrap(),
    );

    assert_eq!(full.different.len(), 2);
    assert_eq!(partial.different, full.different);
    assert_eq!(partial.missing, full.missing);
}

#[test]
fn test_source_error_carries_run_context() {
    let run_id = RunId::from_string("run-fixed".to_string());
    let ctx = RunContext::with_run_id(run_id.clone());
    let new = VecSource::new("new", vec![]);

    let err = differ(materials_config())
        .diff_in_context(&ctx, &FailingSource, &new, DiffOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Source);
    assert_eq!(err.run_id(), Some(&run_id));
    assert!(new.last_query().is_none());
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let err = Differ::new(DifferConfig::new("")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
}

#[test]
fn test_results_are_deterministic() {
    let build = || {
        (
            VecSource::new(
                "old",
                vec![material("z", 1.0, "A"), material("m", 1.0, "A"), material("b", -1.0, "A")],
            ),
            VecSource::new(
                "new",
                vec![material("b", 1.0, "B"), material("m", 3.0, "A"), material("q", 1.0, "A")],
            ),
        )
    };
    let d = differ(materials_config());
    let (o1, n1) = build();
    let (o2, n2) = build();

    let first = d.diff(&o1, &n1, DiffOptions::default()).unwrap().to_value();
    let second = d.diff(&o2, &n2, DiffOptions::default()).unwrap().to_value();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    let changed: Vec<&str> = first["different"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["task_id"].as_str().unwrap())
        .collect();
    assert_eq!(changed, vec!["b", "b", "m"]);
}
