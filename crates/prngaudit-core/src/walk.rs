//! Random-walk excursion analysis of raw generator output.
//!
//! Raw integers are turned into ±1 steps and summed into a walk. The analyzer
//! reports how often the walk occupies each level, the distribution of final
//! positions over many short independent walks, and the autocorrelation of the
//! step sequence. For a fair generator the final position after `L` steps has
//! mean 0 and variance `L`, and steps are uncorrelated at every lag.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{AuditError, Result};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Word size used when expanding raw integers into bits.
///
/// No `Default`: 32- and 64-bit expansion of the same numbers produce
/// different walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BitWidth {
    #[serde(rename = "32")]
    W32,
    #[serde(rename = "64")]
    W64,
}

impl BitWidth {
    /// Number of bits per raw value.
    pub fn bits(self) -> u32 {
        match self {
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    /// Largest raw value representable at this width.
    pub fn max_value(self) -> u64 {
        match self {
            Self::W32 => u32::MAX as u64,
            Self::W64 => u64::MAX,
        }
    }

    /// Parse `32` or `64`.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Self::W32),
            64 => Ok(Self::W64),
            other => Err(AuditError::invalid_config("bit_width", other, "32 or 64")),
        }
    }
}

impl std::fmt::Display for BitWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Step sequence whose autocorrelation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocorrelationInput {
    /// Parity steps of the last trial slice, as the historical chart tool did.
    LastTrial,
    /// Bit-expanded steps of the single walk.
    Walk,
}

/// Parameters of [`analyze_walk`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkConfig {
    pub bit_width: BitWidth,
    /// Symmetric, inclusive range of levels to count, e.g. `-9..=9`.
    pub level_range: RangeInclusive<i64>,
    /// Whether level 0 is counted.
    pub include_zero: bool,
    /// Raw values reserved for the single walk. `None` lets the single walk
    /// and the trials both read the whole sequence from the start; `Some(n)`
    /// gives the walk `raw[..n]` and the trials `raw[n..]`.
    pub walk_length: Option<usize>,
    pub num_trials: usize,
    /// Raw values (= steps) per trial.
    pub trial_length: usize,
    pub max_lag: usize,
    pub autocorrelation_input: AutocorrelationInput,
}

impl WalkConfig {
    pub const DEFAULT_LEVEL: i64 = 9;
    pub const DEFAULT_TRIALS: usize = 5000;
    pub const DEFAULT_TRIAL_LENGTH: usize = 1000;
    pub const DEFAULT_MAX_LAG: usize = 50;

    /// Historical parameters: levels -9..=9, 5000 trials of 1000 steps, lags 1..=50.
    pub fn new(bit_width: BitWidth) -> Self {
        Self {
            bit_width,
            level_range: -Self::DEFAULT_LEVEL..=Self::DEFAULT_LEVEL,
            include_zero: true,
            walk_length: None,
            num_trials: Self::DEFAULT_TRIALS,
            trial_length: Self::DEFAULT_TRIAL_LENGTH,
            max_lag: Self::DEFAULT_MAX_LAG,
            autocorrelation_input: AutocorrelationInput::LastTrial,
        }
    }

    /// Raw values needed by a walk of `walk_length` values followed by all trials.
    pub fn required_values(&self, walk_length: usize) -> Option<usize> {
        self.num_trials
            .checked_mul(self.trial_length)?
            .checked_add(walk_length)
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi) = (*self.level_range.start(), *self.level_range.end());
        if lo > hi || hi.checked_neg() != Some(lo) {
            return Err(AuditError::invalid_config(
                "level_range",
                format!("{lo}..={hi}"),
                "a symmetric range -k..=k",
            ));
        }
        if hi == 0 && !self.include_zero {
            return Err(AuditError::invalid_config(
                "level_range",
                "0..=0 without zero",
                "at least one level to count",
            ));
        }
        if self.num_trials == 0 {
            return Err(AuditError::invalid_config("num_trials", 0, "a value > 0"));
        }
        if self.trial_length == 0 {
            return Err(AuditError::invalid_config("trial_length", 0, "a value > 0"));
        }
        if self.max_lag == 0 {
            return Err(AuditError::invalid_config("max_lag", 0, "a value > 0"));
        }
        if self.walk_length == Some(0) {
            return Err(AuditError::invalid_config("walk_length", 0, "a value > 0"));
        }
        if self.num_trials.checked_mul(self.trial_length).is_none() {
            return Err(AuditError::invalid_config(
                "num_trials * trial_length",
                format!("{} * {}", self.num_trials, self.trial_length),
                "a product that fits in usize",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Visits to one level of the walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelVisits {
    pub level: i64,
    pub visits: u64,
    /// `visits` divided by the number of walk positions, for comparing walks
    /// of different lengths.
    pub frequency: f64,
}

/// Mean and population variance of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleMoments {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Final positions of the repeated short walks.
#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    pub num_trials: usize,
    pub trial_length: usize,
    pub final_positions: Vec<i64>,
    pub moments: SampleMoments,
    /// Variance of a fair walk of `trial_length` steps.
    pub expected_variance: f64,
}

/// Autocorrelation at a single lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

/// Full output of [`analyze_walk`].
#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    pub bit_width: BitWidth,
    /// Raw values expanded into the single walk.
    pub raw_values: usize,
    /// Steps (and positions) in the single walk.
    pub walk_length: usize,
    pub final_position: i64,
    pub position_moments: SampleMoments,
    pub level_visits: Vec<LevelVisits>,
    pub trials: TrialSummary,
    pub autocorrelation_input: AutocorrelationInput,
    /// Steps in the sequence the autocorrelation was computed over.
    pub autocorrelation_length: usize,
    pub autocorrelation: Vec<LagCorrelation>,
    pub max_abs_correlation: f64,
    pub max_abs_lag: usize,
}

// ---------------------------------------------------------------------------
// Sub-algorithms
// ---------------------------------------------------------------------------

/// Unpack each value into `bit_width` bits, most significant first.
pub fn expand_bits(raw: &[u64], bit_width: BitWidth) -> Vec<u8> {
    let width = bit_width.bits();
    let mut bits = Vec::with_capacity(raw.len() * width as usize);
    for &value in raw {
        for shift in (0..width).rev() {
            bits.push(((value >> shift) & 1) as u8);
        }
    }
    bits
}

/// Map bit 0 to step -1 and bit 1 to step +1.
pub fn bits_to_steps(bits: &[u8]) -> Vec<i8> {
    bits.iter().map(|&b| if b == 1 { 1 } else { -1 }).collect()
}

/// One step per raw value: even → -1, odd → +1.
pub fn parity_steps(raw: &[u64]) -> Vec<i8> {
    raw.iter().map(|&v| if v & 1 == 1 { 1 } else { -1 }).collect()
}

/// Running sum of the steps; the implicit start at 0 is not included.
pub fn walk_positions(steps: &[i8]) -> Vec<i64> {
    steps
        .iter()
        .scan(0i64, |pos, &s| {
            *pos += s as i64;
            Some(*pos)
        })
        .collect()
}

/// Count how many positions equal each level in `range`.
///
/// A walk of `n` steps never leaves `-n..=n`, so levels outside that span are
/// not reported.
pub fn count_level_visits(
    positions: &[i64],
    range: RangeInclusive<i64>,
    include_zero: bool,
) -> Vec<LevelVisits> {
    let n = positions.len();
    let reach = i64::try_from(n).unwrap_or(i64::MAX);
    let lo = (*range.start()).max(-reach);
    let hi = (*range.end()).min(reach);
    if lo > hi {
        return Vec::new();
    }
    let mut counts = vec![0u64; (hi - lo) as usize + 1];
    for &p in positions {
        if (lo..=hi).contains(&p) {
            counts[(p - lo) as usize] += 1;
        }
    }
    (lo..=hi)
        .zip(counts)
        .filter(|&(level, _)| include_zero || level != 0)
        .map(|(level, visits)| LevelVisits {
            level,
            visits,
            frequency: if n == 0 { 0.0 } else { visits as f64 / n as f64 },
        })
        .collect()
}

/// Final position of each of `num_trials` walks over consecutive, disjoint
/// slices of `trial_length` raw values, stepping by parity.
pub fn final_positions(raw: &[u64], num_trials: usize, trial_length: usize) -> Result<Vec<i64>> {
    let needed = num_trials.checked_mul(trial_length).ok_or_else(|| {
        AuditError::invalid_config(
            "num_trials * trial_length",
            format!("{num_trials} * {trial_length}"),
            "a product that fits in usize",
        )
    })?;
    if num_trials == 0 || trial_length == 0 {
        return Err(AuditError::invalid_config(
            "num_trials, trial_length",
            format!("{num_trials}, {trial_length}"),
            "both > 0",
        ));
    }
    if raw.len() < needed {
        return Err(AuditError::insufficient("trial aggregation", needed, raw.len()));
    }
    Ok(raw[..needed]
        .chunks_exact(trial_length)
        .map(|slice| parity_steps(slice).iter().map(|&s| s as i64).sum())
        .collect())
}

/// Mean, population variance and standard deviation.
pub fn sample_moments(values: &[f64]) -> SampleMoments {
    if values.is_empty() {
        return SampleMoments {
            mean: 0.0,
            variance: 0.0,
            std_dev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    SampleMoments {
        mean,
        variance,
        std_dev: variance.sqrt(),
    }
}

/// Pearson correlation of two equal-length series (population normalization).
///
/// Returns 0.0 when either series is constant.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (cov, ss_a, ss_b) = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x - mean_a, y - mean_b))
        .fold((0.0, 0.0, 0.0), |(c, sa, sb), (dx, dy)| {
            (c + dx * dy, sa + dx * dx, sb + dy * dy)
        });
    let scale = (ss_a * ss_b).sqrt();
    if scale > 1e-10 { cov / scale } else { 0.0 }
}

/// Correlation between `steps[..n-lag]` and `steps[lag..]` for lags `1..=max_lag`.
pub fn autocorrelation(steps: &[i8], max_lag: usize) -> Result<Vec<f64>> {
    if max_lag == 0 {
        return Err(AuditError::invalid_config("max_lag", 0, "a value > 0"));
    }
    let n = steps.len();
    if n <= max_lag {
        return Err(AuditError::insufficient("autocorrelation", max_lag + 1, n));
    }
    let series: Vec<f64> = steps.iter().map(|&s| s as f64).collect();
    Ok((1..=max_lag)
        .map(|lag| pearson(&series[..n - lag], &series[lag..]))
        .collect())
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Run every walk sub-analysis over `raw`.
///
/// All parameters and data are validated before any computation, so either a
/// complete report or an error is returned.
pub fn analyze_walk(raw: &[u64], config: &WalkConfig) -> Result<WalkReport> {
    config.validate()?;
    if raw.is_empty() {
        return Err(AuditError::insufficient("walk", 1, 0));
    }
    if let Some((i, &v)) = raw
        .iter()
        .enumerate()
        .find(|&(_, &v)| v > config.bit_width.max_value())
    {
        return Err(AuditError::invalid_input(
            format!("raw[{i}]"),
            v,
            format!("a {}-bit unsigned value", config.bit_width),
        ));
    }

    let (walk_raw, trial_raw) = match config.walk_length {
        Some(n) if n > raw.len() => {
            return Err(AuditError::insufficient("walk_length", n, raw.len()));
        }
        Some(n) => raw.split_at(n),
        None => (raw, raw),
    };
    let needed = config.num_trials * config.trial_length;
    if trial_raw.len() < needed {
        return Err(AuditError::insufficient(
            "trial aggregation",
            needed,
            trial_raw.len(),
        ));
    }
    let walk_steps = walk_raw.len() * config.bit_width.bits() as usize;
    let autocorrelation_length = match config.autocorrelation_input {
        AutocorrelationInput::LastTrial => config.trial_length,
        AutocorrelationInput::Walk => walk_steps,
    };
    if autocorrelation_length <= config.max_lag {
        return Err(AuditError::insufficient(
            "autocorrelation",
            config.max_lag + 1,
            autocorrelation_length,
        ));
    }

    log::debug!(
        "walk: {} raw values ({}-bit, {} steps), {} trials x {}",
        walk_raw.len(),
        config.bit_width,
        walk_steps,
        config.num_trials,
        config.trial_length
    );

    let steps = bits_to_steps(&expand_bits(walk_raw, config.bit_width));
    let positions = walk_positions(&steps);
    let level_visits =
        count_level_visits(&positions, config.level_range.clone(), config.include_zero);
    let position_values: Vec<f64> = positions.iter().map(|&p| p as f64).collect();
    let position_moments = sample_moments(&position_values);

    let finals = final_positions(trial_raw, config.num_trials, config.trial_length)?;
    let final_values: Vec<f64> = finals.iter().map(|&p| p as f64).collect();
    let trials = TrialSummary {
        num_trials: config.num_trials,
        trial_length: config.trial_length,
        moments: sample_moments(&final_values),
        final_positions: finals,
        expected_variance: config.trial_length as f64,
    };

    let last_trial;
    let correlated: &[i8] = match config.autocorrelation_input {
        AutocorrelationInput::LastTrial => {
            last_trial = parity_steps(&trial_raw[needed - config.trial_length..needed]);
            &last_trial
        }
        AutocorrelationInput::Walk => &steps,
    };
    let autocorrelation: Vec<LagCorrelation> = autocorrelation(correlated, config.max_lag)?
        .into_iter()
        .enumerate()
        .map(|(i, correlation)| LagCorrelation {
            lag: i + 1,
            correlation,
        })
        .collect();
    let (max_abs_lag, max_abs_correlation) = autocorrelation
        .iter()
        .map(|c| (c.lag, c.correlation.abs()))
        .fold((1, 0.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });

    Ok(WalkReport {
        bit_width: config.bit_width,
        raw_values: walk_raw.len(),
        walk_length: steps.len(),
        final_position: positions.last().copied().unwrap_or(0),
        position_moments,
        level_visits,
        trials,
        autocorrelation_input: config.autocorrelation_input,
        autocorrelation_length,
        autocorrelation,
        max_abs_correlation,
        max_abs_lag,
    })
}
