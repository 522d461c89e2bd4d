//! External generator process.
//!
//! The generator is invoked as
//! `<program> [leading args..] <output_file> <generator_name> <count> <seed>`
//! and must write `count` unsigned integers, one per line, to `output_file`.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{AuditError, Result};
use crate::source::{DataSource, SourceInfo, SourceKind};
use crate::sources::text::read_raw_integers;
use crate::walk::BitWidth;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for [`ProcessSource`].
#[derive(Debug, Clone)]
pub struct ProcessSourceConfig {
    /// Generator executable.
    pub program: PathBuf,
    /// Arguments placed before the positional protocol arguments.
    pub leading_args: Vec<String>,
    /// Name of the generator the executable should run.
    pub generator: String,
    pub bit_width: BitWidth,
    /// Where the generator writes its output. A temporary file when `None`.
    pub output_path: Option<PathBuf>,
    /// Wall-clock limit for one invocation.
    pub timeout: Duration,
}

impl ProcessSourceConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(
        program: impl Into<PathBuf>,
        generator: impl Into<String>,
        bit_width: BitWidth,
    ) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            generator: generator.into(),
            bit_width,
            output_path: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Source that runs an external generator once per [`DataSource::supply`] call.
pub struct ProcessSource {
    info: SourceInfo,
    config: ProcessSourceConfig,
}

impl ProcessSource {
    pub fn new(config: ProcessSourceConfig) -> Self {
        Self {
            info: SourceInfo {
                name: config.generator.clone(),
                description: format!(
                    "{}-bit output of {}",
                    config.bit_width,
                    config.program.display()
                ),
                kind: SourceKind::Process,
            },
            config,
        }
    }

    fn fail(&self, reason: impl Into<String>) -> AuditError {
        AuditError::upstream(&self.info.name, reason)
    }

    /// Run the generator to completion, killing it at the deadline.
    fn run(&self, output: &std::path::Path, count: usize, seed: u64) -> Result<()> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.leading_args)
            .arg(output)
            .arg(&self.config.generator)
            .arg(count.to_string())
            .arg(seed.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                self.fail(format!(
                    "failed to start {}: {e}",
                    self.config.program.display()
                ))
            })?;

        // Drain stderr on a separate thread so a chatty child cannot block on a full pipe.
        let stderr = child.stderr.take();
        let drain = thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_string(&mut text);
            }
            text
        });

        let deadline = Instant::now() + self.config.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.fail(format!(
                        "timed out after {:.1}s",
                        self.config.timeout.as_secs_f64()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(self.fail(format!("wait failed: {e}"))),
            }
        };

        let stderr_text = drain.join().unwrap_or_default();
        if !status.success() {
            let detail = stderr_text.trim();
            return Err(self.fail(if detail.is_empty() {
                format!("exited with {status}")
            } else {
                format!("exited with {status}: {detail}")
            }));
        }
        Ok(())
    }
}

impl DataSource for ProcessSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn supply(&self, count: usize, seed: u64) -> Result<Vec<u64>> {
        // The temp file is removed when `scratch` drops, after parsing.
        let scratch;
        let output = match &self.config.output_path {
            Some(path) => path.clone(),
            None => {
                scratch = tempfile::Builder::new()
                    .prefix("prngaudit-")
                    .suffix(".txt")
                    .tempfile()
                    .map_err(|e| self.fail(format!("cannot create output file: {e}")))?;
                scratch.path().to_path_buf()
            }
        };

        log::info!(
            "running {} for {count} values of '{}' (seed {seed})",
            self.config.program.display(),
            self.config.generator
        );
        let started = Instant::now();
        self.run(&output, count, seed)?;
        log::debug!(
            "generator finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );

        let values = read_raw_integers(&output, self.config.bit_width)
            .map_err(|e| self.fail(format!("unreadable output: {e}")))?;
        if values.len() != count {
            return Err(self.fail(format!(
                "wrote {} values, {count} requested",
                values.len()
            )));
        }
        Ok(values)
    }
}
