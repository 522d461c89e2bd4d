//! `prngaudit walk`: random-walk excursion analysis of raw output.

use std::time::{Duration, Instant};

use prngaudit_core::{
    AuditError, AutocorrelationInput, BitWidth, DataSource, FileSource, ProcessSource,
    ProcessSourceConfig, WalkConfig, WalkReport, analyze_walk, supply_exact,
};

/// Flags of the walk command.
pub struct WalkCommandConfig<'a> {
    pub input: Option<&'a str>,
    pub generator_bin: Option<&'a str>,
    pub generator: Option<&'a str>,
    pub bit_width: &'a str,
    pub length: usize,
    pub seed: u64,
    pub trials: usize,
    pub trial_length: Option<usize>,
    pub max_lag: usize,
    pub levels: i64,
    pub autocorrelation: &'a str,
    pub include_zero: bool,
    pub timeout_sec: f64,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: WalkCommandConfig<'_>) {
    let bits: u32 = cfg.bit_width.parse().unwrap_or(0);
    let bit_width = super::or_exit(BitWidth::from_bits(bits));
    if cfg.length == 0 {
        super::or_exit::<()>(Err(AuditError::invalid_config("length", 0, "a value > 0")));
    }

    let trial_length = cfg.trial_length.unwrap_or(cfg.length);
    let config = WalkConfig {
        level_range: -cfg.levels..=cfg.levels,
        include_zero: cfg.include_zero,
        walk_length: Some(cfg.length),
        num_trials: cfg.trials,
        trial_length,
        max_lag: cfg.max_lag,
        autocorrelation_input: match cfg.autocorrelation {
            "walk" => AutocorrelationInput::Walk,
            _ => AutocorrelationInput::LastTrial,
        },
        ..WalkConfig::new(bit_width)
    };
    let count = super::or_exit(config.required_values(cfg.length).ok_or_else(|| {
        AuditError::invalid_config(
            "length + trials * trial_length",
            format!("{} + {} * {trial_length}", cfg.length, cfg.trials),
            "a total that fits in usize",
        )
    }));

    let source = super::or_exit(make_source(&cfg, bit_width));
    println!(
        "Collecting {count} values from {} [{}] (seed {})...",
        source.name(),
        source.info().description,
        cfg.seed
    );
    let t0 = Instant::now();
    let raw = super::or_exit(supply_exact(source.as_ref(), count, cfg.seed));
    println!("  done in {:.1}s\n", t0.elapsed().as_secs_f64());

    let report = super::or_exit(analyze_walk(&raw, &config));
    print_report(&report);

    if let Some(path) = cfg.output_path {
        super::write_json(path, &report);
    }
}

fn make_source(
    cfg: &WalkCommandConfig<'_>,
    bit_width: BitWidth,
) -> prngaudit_core::Result<Box<dyn DataSource>> {
    if let Some(path) = cfg.input {
        return Ok(Box::new(FileSource::new(path, bit_width)));
    }
    let (Some(program), Some(generator)) = (cfg.generator_bin, cfg.generator) else {
        return Err(AuditError::invalid_config(
            "source",
            "none",
            "--input FILE or --generator-bin BIN --generator NAME",
        ));
    };
    if !(cfg.timeout_sec.is_finite() && cfg.timeout_sec > 0.0) {
        return Err(AuditError::invalid_config(
            "timeout_sec",
            cfg.timeout_sec,
            "a positive number of seconds",
        ));
    }
    let mut process = ProcessSourceConfig::new(program, generator, bit_width);
    process.timeout = Duration::from_secs_f64(cfg.timeout_sec);
    Ok(Box::new(ProcessSource::new(process)))
}

fn print_report(report: &WalkReport) {
    println!("Single walk");
    println!("  raw values        {}", report.raw_values);
    println!("  steps             {}", report.walk_length);
    println!("  final position    {}", report.final_position);
    println!(
        "  position mean     {:.3}  (variance {:.3})",
        report.position_moments.mean, report.position_moments.variance
    );

    println!("\n  {:>6} {:>10} {:>10}", "Level", "Visits", "Freq");
    for v in &report.level_visits {
        println!("  {:>6} {:>10} {:>10.6}", v.level, v.visits, v.frequency);
    }

    let t = &report.trials;
    let ratio = if t.expected_variance > 0.0 {
        t.moments.variance / t.expected_variance
    } else {
        0.0
    };
    println!(
        "\nFinal positions of {} walks of {} steps",
        t.num_trials, t.trial_length
    );
    println!("  mean              {:.4}  (expected 0)", t.moments.mean);
    println!(
        "  variance          {:.4}  (expected {:.0}, ratio {:.3})",
        t.moments.variance, t.expected_variance, ratio
    );
    println!("  std dev           {:.4}", t.moments.std_dev);

    let input = match report.autocorrelation_input {
        AutocorrelationInput::LastTrial => "last trial parity steps",
        AutocorrelationInput::Walk => "single walk bit steps",
    };
    println!(
        "\nStep autocorrelation over {} {input}, lags 1..={}",
        report.autocorrelation_length,
        report.autocorrelation.len()
    );
    let mut strongest: Vec<_> = report.autocorrelation.iter().collect();
    strongest.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for c in strongest.iter().take(5) {
        println!("  lag {:>4}  {:>+9.5}", c.lag, c.correlation);
    }
    // 3 / sqrt(n) is the usual white-noise band for a sample autocorrelation.
    let band = 3.0 / (report.autocorrelation_length as f64).sqrt();
    println!(
        "  max |r| = {:.5} at lag {}  {} (band ±{band:.5})",
        report.max_abs_correlation,
        report.max_abs_lag,
        super::mark(report.max_abs_correlation <= band)
    );
}
