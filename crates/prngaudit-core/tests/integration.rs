//! Integration tests for prngaudit-core.
//!
//! These exercise the full pipelines:
//! result directory → p-value files → second-order assessment, and
//! data source → raw integers → random-walk report.

use std::fs;
use std::io::Write;

use prngaudit_core::sources::text::read_p_values;
use prngaudit_core::{
    AutocorrelationInput, BitWidth, DataSource, ExpectedCount, FileSource, MemorySource, NistTestKind, WalkConfig,
    analyze_walk, assess_test, list_p_value_files, read_result_summaries, results, supply_exact,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn lines<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn result_directory_assessment() {
    let root = tempfile::tempdir().unwrap();
    let run = root.path().join("mt19937_0.01");
    fs::create_dir(&run).unwrap();

    let spread: Vec<f64> = (0..100).map(|i| (i as f64 + 0.5) / 100.0).collect();
    let clumped = vec![0.05f64; 100];
    fs::write(run.join("Frequency_Test.txt"), lines(&spread)).unwrap();
    fs::write(run.join("Runs_Test.txt"), lines(&clumped)).unwrap();
    fs::write(run.join("Runs_Test_errors.txt"), "segfault\n").unwrap();
    fs::write(run.join("result.txt"), "Pass test count: 14\n").unwrap();

    let files = list_p_value_files(&run).unwrap();
    assert_eq!(files.len(), 2);

    let mut verdicts = Vec::new();
    for file in &files {
        let key = results::test_key(file);
        let kind = NistTestKind::from_key(&key).expect("known test");
        let p_values = read_p_values(file).unwrap();
        let assessment = assess_test(&key, &p_values, ExpectedCount::SelfNormalized, 0.01).unwrap();
        verdicts.push((kind, assessment.uniformity.passed, assessment.passed));
    }
    assert_eq!(
        verdicts,
        vec![
            (NistTestKind::Frequency, true, true),
            (NistTestKind::Runs, false, false),
        ]
    );

    let summaries = read_result_summaries(root.path()).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "mt19937_0.01");
    assert_eq!(summaries[0].summary, "Pass test count: 14");
}

#[test]
fn fixed_budget_penalizes_missing_p_values() {
    // Uniform across bins but only half the declared trials made it to disk.
    let p_values: Vec<f64> = (0..500).map(|i| (i as f64 + 0.5) / 500.0).collect();
    let own = assess_test("Serial_Test", &p_values, ExpectedCount::SelfNormalized, 0.01).unwrap();
    let budget = assess_test(
        "Serial_Test",
        &p_values,
        ExpectedCount::FixedBudget { trials: 1000 },
        0.01,
    )
    .unwrap();
    assert!(own.uniformity.passed);
    assert!(!budget.uniformity.passed);
    assert_eq!(budget.uniformity.expected_per_bin, 100.0);
}

#[test]
fn walk_from_memory_source_with_split() {
    let mut rng = StdRng::seed_from_u64(7);
    let walk_len = 200;
    let mut config = WalkConfig::new(BitWidth::W32);
    config.num_trials = 500;
    config.trial_length = 100;
    config.walk_length = Some(walk_len);
    config.autocorrelation_input = AutocorrelationInput::Walk;

    let count = config.required_values(walk_len).unwrap();
    let values: Vec<u64> = (0..count).map(|_| rng.random::<u32>() as u64).collect();
    let source = MemorySource::new("stdrng", values);

    let raw = supply_exact(&source, count, 7).unwrap();
    let report = analyze_walk(&raw, &config).unwrap();

    assert_eq!(report.raw_values, walk_len);
    assert_eq!(report.walk_length, walk_len * 32);
    assert_eq!(report.level_visits.len(), 19);
    assert_eq!(report.trials.final_positions.len(), 500);
    assert_eq!(report.autocorrelation.len(), WalkConfig::DEFAULT_MAX_LAG);
    assert!(report.max_abs_correlation < 0.1);
    // Var of a 100-step fair walk is 100; 500 trials keep the estimate well inside 60..140.
    let var = report.trials.moments.variance;
    assert!((60.0..140.0).contains(&var), "trial variance {var}");
}

#[test]
fn counter_generator_collapses_trial_spread() {
    // Parity alternates, so every even-length trial ends exactly at 0.
    let mut config = WalkConfig::new(BitWidth::W64);
    config.num_trials = 50;
    config.trial_length = 20;
    config.max_lag = 10;
    let raw: Vec<u64> = (0..1000).collect();
    let report = analyze_walk(&raw, &config).unwrap();
    assert!(report.trials.final_positions.iter().all(|&p| p == 0));
    // The same alternation shows up as perfect anti-correlation of trial steps.
    assert!((report.autocorrelation[0].correlation + 1.0).abs() < 1e-9);
    assert_eq!(report.trials.moments.variance, 0.0);
    assert_eq!(report.trials.expected_variance, 20.0);
}

#[test]
fn walk_from_file_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let values: Vec<u64> = (0..64u64).map(|i| i.wrapping_mul(0x9E37_79B9) & 0xFFFF_FFFF).collect();
    file.write_all(lines(&values).as_bytes()).unwrap();

    let source = FileSource::new(file.path(), BitWidth::W32);
    assert_eq!(source.name(), file.path().display().to_string());

    let mut config = WalkConfig::new(BitWidth::W32);
    config.num_trials = 4;
    config.trial_length = 8;
    config.walk_length = Some(32);
    config.max_lag = 5;
    let count = config.required_values(32).unwrap();
    let raw = supply_exact(&source, count, 0).unwrap();
    let report = analyze_walk(&raw, &config).unwrap();
    assert_eq!(report.walk_length, 32 * 32);

    let err = supply_exact(&source, 65, 0).unwrap_err();
    assert_eq!(err.kind(), "upstream_failure");
}

#[test]
fn reports_serialize_to_json() {
    let p_values: Vec<f64> = (0..60).map(|i| (i as f64 + 0.5) / 60.0).collect();
    let assessment =
        assess_test("Runs_Test", &p_values, ExpectedCount::FixedBudget { trials: 60 }, 0.01)
            .unwrap();
    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["key"], "Runs_Test");
    assert_eq!(json["uniformity"]["expected"]["mode"], "fixed_budget");
    assert_eq!(json["uniformity"]["bin_counts"].as_array().unwrap().len(), 10);

    let mut config = WalkConfig::new(BitWidth::W64);
    config.num_trials = 1;
    config.trial_length = 2;
    config.max_lag = 3;
    config.autocorrelation_input = AutocorrelationInput::Walk;
    let report = analyze_walk(&[u64::MAX, 0], &config).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["bit_width"], "64");
    assert_eq!(json["autocorrelation"].as_array().unwrap().len(), 3);
    assert_eq!(json["autocorrelation_input"], "walk");
}
