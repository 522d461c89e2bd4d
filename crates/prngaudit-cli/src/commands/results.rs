//! `prngaudit results`: verdict line of each battery run.

use std::path::Path;

use prngaudit_core::read_result_summaries;

pub fn run(dir: &str) {
    let root = Path::new(dir);
    if !root.exists() {
        println!("No result directory found at {dir}");
        return;
    }

    let runs = super::or_exit(read_result_summaries(root));
    if runs.is_empty() {
        println!("No runs with result.txt under {dir}");
        return;
    }

    let width = runs.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for run in &runs {
        println!("{:<width$}  {}", format!("{}:", run.name), run.summary, width = width + 1);
    }
}
