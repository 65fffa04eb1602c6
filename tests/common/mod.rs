use std::path::PathBuf;
use tempfile::TempDir;

/// Write `content` as a report file inside a fresh temporary directory,
/// returning the dir handle and the report path as a string.
/// The caller must hold onto `TempDir` to keep the temp directory alive.
#[allow(dead_code)]
pub fn write_report(name: &str, content: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path.to_str().unwrap().to_string())
}

/// Absolute path of a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}
