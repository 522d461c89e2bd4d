//! Layout of battery result directories.
//!
//! ```text
//! results/nist_test/
//!   mt19937_0.01/
//!     Frequency_Test.txt      one p-value per line
//!     Runs_Test.txt
//!     ...
//!     result.txt              last line is the overall verdict
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AuditError, Result};

/// Verdict file written next to the p-value files.
pub const RESULT_FILE: &str = "result.txt";

const ERRORS_SUFFIX: &str = "_errors.txt";

/// Last line of one run's `result.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Run directory name, conventionally `<generator>_<alpha>`.
    pub name: String,
    pub summary: String,
}

/// P-value files in a run directory, sorted by path.
pub fn list_p_value_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = read_dir(dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .filter(|path| {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            name.ends_with(".txt") && name != RESULT_FILE && !name.ends_with(ERRORS_SUFFIX)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// File stem of a p-value file, i.e. the test key.
pub fn test_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Summary line of every run under `root` that has a `result.txt`.
pub fn read_result_summaries(root: &Path) -> Result<Vec<RunSummary>> {
    let mut runs = Vec::new();
    for dir in read_dir(root)? {
        let result = dir.join(RESULT_FILE);
        if !dir.is_dir() || !result.is_file() {
            continue;
        }
        let text = fs::read_to_string(&result)
            .map_err(|e| AuditError::upstream(result.display().to_string(), e.to_string()))?;
        let summary = text
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        runs.push(RunSummary {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            summary,
        });
    }
    runs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(runs)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AuditError::upstream(dir.display().to_string(), e.to_string()))?;
    entries
        .map(|entry| {
            entry
                .map(|e| e.path())
                .map_err(|e| AuditError::upstream(dir.display().to_string(), e.to_string()))
        })
        .collect()
}
