use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Directory holding the checked-in fixtures
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Write a materials table equivalent to `fixtures/new.json` into `path`
#[allow(dead_code)]
pub fn write_materials_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE materials (
            task_id TEXT NOT NULL,
            state TEXT,
            formula TEXT,
            spacegroup INTEGER,
            energy REAL,
            volume REAL,
            label TEXT
        );
        INSERT INTO materials VALUES ('mp-1', 'successful', 'NaCl', 225, -3.41, 44.1, 'rocksalt');
        INSERT INTO materials VALUES ('mp-2', 'successful', 'KCl', 221, -3.00, 60.0, 'sylvite (revised)');
        INSERT INTO materials VALUES ('mp-5', 'successful', 'MgO', 225, -5.95, 19.0, NULL);
        INSERT INTO materials VALUES ('mp-4', 'successful', 'CsCl', 221, -2.90, 70.0, NULL);",
    )
    .unwrap();
}
