pub mod results;
pub mod uniformity;
pub mod walk;

use prngaudit_core::AuditError;
use serde::Serialize;

/// Unwrap a library result or print the error and exit with status 1.
pub fn or_exit<T>(result: Result<T, AuditError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::debug!("{} error: {e:?}", e.kind());
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Write `value` as pretty JSON to `path`, exiting with status 1 on failure.
pub fn write_json<T: Serialize>(path: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize results: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(path, json) {
        eprintln!("Failed to write {path}: {e}");
        std::process::exit(1);
    }
    println!("\nResults saved to {path}");
}

/// `✓`/`✗` marker for a verdict.
pub fn mark(passed: bool) -> &'static str {
    if passed { "✓" } else { "✗" }
}
