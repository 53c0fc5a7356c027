use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub fn conformance_dir() -> PathBuf {
    std::env::var("VRCMRD_CONFORMANCE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("conformance"))
}

/// Loads a YAML suite, or `None` when the file is absent.
pub fn load_suite<T: DeserializeOwned>(file: &str) -> Option<Vec<T>> {
    let path = conformance_dir().join(file);
    if !path.exists() {
        eprintln!("Skipping suite: {:?} not found", path);
        return None;
    }
    let content = std::fs::read_to_string(&path).unwrap();
    Some(serde_saphyr::from_str(&content).unwrap())
}

/// Instant account ages in the suites are measured against.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn report(suite: &str, passed: usize, failed: usize) {
    eprintln!("{}: {} passed, {} failed", suite, passed, failed);
    assert_eq!(failed, 0, "{} conformance failures in {}", failed, suite);
}
