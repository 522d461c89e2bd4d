//! CLI for prngaudit: second-order checks on PRNG test results and raw output.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "prngaudit")]
#[command(about = "prngaudit: uniformity of NIST p-values and random-walk excursions of raw PRNG output")]
#[command(version = prngaudit_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chi-square uniformity and pass proportion of battery p-values.
    /// PATH is a single p-value file or a run directory of them.
    Uniformity {
        /// P-value file or result directory (e.g. results/nist_test/mt19937_0.01)
        path: String,

        /// Declared number of trials; switches the expected bin count to trials/10
        #[arg(long)]
        trials: Option<usize>,

        /// Significance level of the underlying tests
        #[arg(long, default_value_t = prngaudit_core::uniformity::DEFAULT_ALPHA)]
        alpha: f64,

        /// Write results as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Random-walk excursion analysis of raw generator output
    Walk {
        /// Read raw integers from a file instead of running a generator
        #[arg(long, conflicts_with_all = ["generator_bin", "generator"])]
        input: Option<String>,

        /// Generator executable: `<bin> <output_file> <generator> <count> <seed>`
        #[arg(long, requires = "generator")]
        generator_bin: Option<String>,

        /// Generator name passed to the executable
        #[arg(long, requires = "generator_bin")]
        generator: Option<String>,

        /// Width of each raw value in bits
        #[arg(long, value_parser = ["32", "64"])]
        bit_width: String,

        /// Raw values in the single walk
        #[arg(long)]
        length: usize,

        /// Seed passed to the generator
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of short walks for the final-position distribution
        #[arg(long, default_value_t = prngaudit_core::WalkConfig::DEFAULT_TRIALS)]
        trials: usize,

        /// Steps per short walk (default: --length)
        #[arg(long)]
        trial_length: Option<usize>,

        /// Largest autocorrelation lag
        #[arg(long, default_value_t = prngaudit_core::WalkConfig::DEFAULT_MAX_LAG)]
        max_lag: usize,

        /// Count visits to levels -R..=R
        #[arg(
            long,
            default_value_t = prngaudit_core::WalkConfig::DEFAULT_LEVEL,
            value_parser = clap::value_parser!(i64).range(0..)
        )]
        levels: i64,

        /// Step sequence for the autocorrelation: last-trial (parity steps) or walk (bit steps)
        #[arg(long, default_value = "last-trial", value_parser = ["last-trial", "walk"])]
        autocorrelation: String,

        /// Leave level 0 out of the visit counts
        #[arg(long)]
        exclude_zero: bool,

        /// Generator timeout in seconds
        #[arg(long, default_value = "60")]
        timeout_sec: f64,

        /// Write the report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the verdict line of every run in a result directory
    Results {
        /// Directory holding one subdirectory per run
        #[arg(long, default_value = "results/nist_test")]
        dir: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Uniformity {
            path,
            trials,
            alpha,
            output,
        } => commands::uniformity::run(&path, trials, alpha, output.as_deref()),
        Commands::Walk {
            input,
            generator_bin,
            generator,
            bit_width,
            length,
            seed,
            trials,
            trial_length,
            max_lag,
            levels,
            autocorrelation,
            exclude_zero,
            timeout_sec,
            output,
        } => commands::walk::run(commands::walk::WalkCommandConfig {
            input: input.as_deref(),
            generator_bin: generator_bin.as_deref(),
            generator: generator.as_deref(),
            bit_width: &bit_width,
            length,
            seed,
            trials,
            trial_length,
            max_lag,
            levels,
            autocorrelation: &autocorrelation,
            include_zero: !exclude_zero,
            timeout_sec,
            output_path: output.as_deref(),
        }),
        Commands::Results { dir } => commands::results::run(&dir),
    }
}
