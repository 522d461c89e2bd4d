//! # prngaudit-core
//!
//! Statistical auditing of pseudorandom number generators.
//!
//! Two independent analyzers work on sequences that are already in memory:
//!
//! - [`uniformity`]: second-order checks on the p-values a randomness test
//!   battery produced (chi-square over ten bins, meta p-value, proportion of
//!   passing sequences).
//! - [`walk`]: bit-level random-walk excursion analysis of raw generator
//!   output (level visits, final-position spread over many trials, step
//!   autocorrelation).
//!
//! Raw data comes from a [`DataSource`]: a literal array, a text file, or an
//! external generator process. Sources do the I/O; the analyzers are pure.
//!
//! ```
//! use prngaudit_core::{BitWidth, ExpectedCount, WalkConfig, analyze_walk, evaluate_uniformity};
//!
//! let p_values: Vec<f64> = (0..100).map(|i| (i as f64 + 0.5) / 100.0).collect();
//! let report = evaluate_uniformity(&p_values, ExpectedCount::SelfNormalized).unwrap();
//! assert!(report.passed);
//!
//! let mut config = WalkConfig::new(BitWidth::W32);
//! config.num_trials = 4;
//! config.trial_length = 8;
//! config.max_lag = 5;
//! let raw: Vec<u64> = (0..32).map(|i| (i * 2_654_435_761u64) & 0xFFFF_FFFF).collect();
//! let walk = analyze_walk(&raw, &config).unwrap();
//! assert_eq!(walk.walk_length, 32 * 32);
//! ```

pub mod error;
pub mod nist;
pub mod results;
pub mod source;
pub mod sources;
pub mod uniformity;
pub mod walk;

pub use error::{AuditError, Result};
pub use nist::NistTestKind;
pub use results::{RunSummary, list_p_value_files, read_result_summaries};
pub use source::{DataSource, SourceInfo, SourceKind, supply_exact};
pub use sources::{FileSource, MemorySource, ProcessSource, ProcessSourceConfig};
pub use uniformity::{
    ExpectedCount, ProportionReport, TestAssessment, UniformityReport, assess_test,
    evaluate_proportion, evaluate_uniformity,
};
pub use walk::{AutocorrelationInput, BitWidth, WalkConfig, WalkReport, analyze_walk};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
