use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const CONFIG: &str = "\
key: task_id
props: [formula, spacegroup]
info: [label]
filter:
  state: successful
deltas:
  energy: \"+-0.05\"
  volume: \"+-2%\"
";

pub const OLD_JSONL: &str = r#"{"task_id": "mp-1", "state": "successful", "formula": "NaCl", "spacegroup": 225, "energy": -3.40, "volume": 44.0, "label": "rocksalt"}
{"task_id": "mp-2", "state": "successful", "formula": "KCl", "spacegroup": 225, "energy": -3.10, "volume": 60.0, "label": "sylvite"}
{"task_id": "mp-3", "state": "successful", "formula": "LiF", "spacegroup": 225, "energy": -4.80, "volume": 16.0}
{"task_id": "mp-4", "state": "failed", "formula": "CsCl", "spacegroup": 221, "energy": -2.90, "volume": 70.0}
"#;

pub const NEW_JSON: &str = r#"[
  {"task_id": "mp-1", "state": "successful", "formula": "NaCl", "spacegroup": 225, "energy": -3.41, "volume": 44.1, "label": "rocksalt"},
  {"task_id": "mp-2", "state": "successful", "formula": "KCl", "spacegroup": 221, "energy": -3.00, "volume": 60.0, "label": "sylvite (revised)"},
  {"task_id": "mp-5", "state": "successful", "formula": "MgO", "spacegroup": 225, "energy": -5.95, "volume": 19.0},
  {"task_id": "mp-4", "state": "successful", "formula": "CsCl", "spacegroup": 221, "energy": -2.90, "volume": 70.0}
]
"#;

#[allow(dead_code)]
/// Paths of a config and two sources written into a scratch directory
pub struct Workspace {
    pub config: PathBuf,
    pub old: PathBuf,
    pub new: PathBuf,
}

#[allow(dead_code)]
pub fn write_workspace(dir: &Path) -> Workspace {
    let ws = Workspace {
        config: dir.join("materials.yaml"),
        old: dir.join("old.jsonl"),
        new: dir.join("new.json"),
    };
    fs::write(&ws.config, CONFIG).unwrap();
    fs::write(&ws.old, OLD_JSONL).unwrap();
    fs::write(&ws.new, NEW_JSON).unwrap();
    ws
}

#[allow(dead_code)]
pub fn recdiff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_recdiff"))
        .args(args)
        .output()
        .expect("Failed to execute recdiff")
}

#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[allow(dead_code)]
pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
