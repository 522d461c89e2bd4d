//! `prngaudit uniformity`: second-order checks on battery p-values.

use std::path::{Path, PathBuf};

use prngaudit_core::sources::text::read_p_values;
use prngaudit_core::uniformity::MIN_RECOMMENDED_SAMPLES;
use prngaudit_core::{
    ExpectedCount, NistTestKind, TestAssessment, assess_test, list_p_value_files, results,
};
use serde::Serialize;

#[derive(Serialize)]
struct UniformityOutput<'a> {
    path: &'a str,
    expected: ExpectedCount,
    alpha: f64,
    passed: usize,
    total: usize,
    tests: &'a [TestAssessment],
}

pub fn run(path: &str, trials: Option<usize>, alpha: f64, output_path: Option<&str>) {
    let expected = match trials {
        Some(trials) => ExpectedCount::FixedBudget { trials },
        None => ExpectedCount::SelfNormalized,
    };

    let target = Path::new(path);
    let files: Vec<PathBuf> = if target.is_dir() {
        super::or_exit(list_p_value_files(target))
    } else {
        vec![target.to_path_buf()]
    };
    if files.is_empty() {
        eprintln!("No p-value files found in {path}");
        std::process::exit(1);
    }

    println!(
        "Second-order analysis of {} test(s), {expected}, alpha = {alpha}\n",
        files.len()
    );

    let mut assessments = Vec::with_capacity(files.len());
    for file in &files {
        let key = results::test_key(file);
        let p_values = super::or_exit(read_p_values(file));
        assessments.push(super::or_exit(assess_test(&key, &p_values, expected, alpha)));
    }

    print_table(&assessments);

    let passed = assessments.iter().filter(|a| a.passed).count();
    println!("\n{passed}/{} tests passed both checks", assessments.len());

    let small: Vec<&str> = assessments
        .iter()
        .filter(|a| !a.uniformity.reliable)
        .map(|a| a.key.as_str())
        .collect();
    if !small.is_empty() {
        println!(
            "Note: fewer than {MIN_RECOMMENDED_SAMPLES} p-values for {}; uniformity verdicts are unreliable.",
            small.join(", ")
        );
    }

    if let Some(out) = output_path {
        super::write_json(
            out,
            &UniformityOutput {
                path,
                expected,
                alpha,
                passed,
                total: assessments.len(),
                tests: &assessments,
            },
        );
    }
}

fn print_table(assessments: &[TestAssessment]) {
    println!(
        "  {:<40} {:>5} {:>10} {:>10} {:>8}  {:<6}",
        "Test", "N", "Chi²", "P-value", "Prop", "Result"
    );
    println!("  {}", "-".repeat(86));

    for a in assessments {
        let name = NistTestKind::from_key(&a.key)
            .map(|k| k.display_name().to_string())
            .unwrap_or_else(|| a.key.clone());
        println!(
            "  {:<40} {:>5} {:>10.4} {:>10.6} {:>8.4}  {} {}",
            truncate(&name, 40),
            a.uniformity.sample_size,
            a.uniformity.chi_square,
            a.uniformity.meta_p_value,
            a.proportion.proportion,
            super::mark(a.passed),
            verdict(a),
        );
        println!("  {:<40} bins {:?}", "", a.uniformity.bin_counts);
    }
}

fn verdict(a: &TestAssessment) -> &'static str {
    match (a.uniformity.passed, a.proportion.passed) {
        (true, true) => "PASS",
        (false, true) => "FAIL (uniformity)",
        (true, false) => "FAIL (proportion)",
        (false, false) => "FAIL",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}…")
    }
}
