#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{fixtures_dir, write_materials_db};
use recdiff_core::{DiffOptions, DiffOutcome, Differ, NoopObserver, RecordSource};
use recdiff_store::{load_config, open_source, JsonFileSource, MemorySource, SqliteSource};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn differ() -> Differ {
    let config = load_config(&fixtures_dir().join("materials.yaml")).unwrap();
    Differ::new(config)
        .unwrap()
        .with_observer(Arc::new(NoopObserver))
}

fn run(old: &dyn RecordSource, new: &dyn RecordSource) -> serde_json::Value {
    match differ().diff(old, new, DiffOptions::default()).unwrap() {
        DiffOutcome::Complete(result) => result.to_value(),
        DiffOutcome::Aborted(reason) => panic!("unexpected abort: {}", reason),
    }
}

#[test]
fn test_jsonl_against_json_array() {
    let old = JsonFileSource::open(fixtures_dir().join("old.jsonl")).unwrap();
    let new = JsonFileSource::open(fixtures_dir().join("new.json")).unwrap();

    let value = run(&old, &new);

    assert_eq!(value["missing"], json!([{"task_id": "mp-3"}]));
    assert_eq!(
        value["additional"],
        json!([{"task_id": "mp-4"}, {"task_id": "mp-5"}])
    );
    assert_eq!(
        value["different"],
        json!([
            {
                "match_type": "delta",
                "task_id": "mp-2",
                "property": "energy",
                "old": "-3.100000",
                "new": "-3.000000",
                "rule": "+-0.05",
                "label": "sylvite (revised)"
            },
            {
                "match_type": "exact",
                "task_id": "mp-2",
                "old": [["formula", "KCl"], ["spacegroup", "225"]],
                "new": [["formula", "KCl"], ["spacegroup", "221"]],
                "label": "sylvite (revised)"
            }
        ])
    );
}

#[test]
fn test_jsonl_against_sqlite_table() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("materials.db");
    write_materials_db(&db_path);

    let old = JsonFileSource::open(fixtures_dir().join("old.jsonl")).unwrap();
    let new = SqliteSource::open(&db_path, "materials").unwrap();

    let value = run(&old, &new);

    assert_eq!(value["missing"], json!([{"task_id": "mp-3"}]));
    // SQL NULL is a present null, so it shows up as an info field
    assert_eq!(
        value["additional"],
        json!([
            {"task_id": "mp-4", "label": null},
            {"task_id": "mp-5", "label": null}
        ])
    );
    let changed: Vec<&str> = value["different"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["match_type"].as_str().unwrap())
        .collect();
    assert_eq!(changed, vec!["delta", "exact"]);
}

#[test]
fn test_open_source_by_extension() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("materials.sqlite");
    write_materials_db(&db_path);

    assert!(open_source(&db_path, Some("materials")).is_ok());
    assert_eq!(
        open_source(&db_path, None).err().unwrap().code(),
        "ERR_INVALID_CONFIG"
    );
    let jsonl = fixtures_dir().join("old.jsonl");
    assert_eq!(open_source(&jsonl, None).unwrap().name(), jsonl.display().to_string());
    assert!(open_source(&jsonl, Some("materials")).is_err());
}

#[test]
fn test_memory_source_matches_file_source() {
    let old = JsonFileSource::open(fixtures_dir().join("old.jsonl")).unwrap();
    let records = old
        .query(&recdiff_core::Selection::all(), &recdiff_core::Projection::default())
        .unwrap()
        .collect::<recdiff_store::Result<Vec<_>>>()
        .unwrap();
    let memory = MemorySource::new("memory", records);
    let new = JsonFileSource::open(fixtures_dir().join("new.json")).unwrap();

    assert_eq!(run(&old, &new), run(&memory, &new));
}

#[test]
fn test_identical_sources_have_no_differences() {
    let old = JsonFileSource::open(fixtures_dir().join("new.json")).unwrap();
    let new = JsonFileSource::open(fixtures_dir().join("new.json")).unwrap();

    let value = run(&old, &new);

    assert_eq!(
        value,
        json!({"missing": [], "additional": [], "different": []})
    );
}
