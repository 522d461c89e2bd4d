//! Data source abstraction.
//!
//! Every supplier of raw generator output implements [`DataSource`]. The
//! analyzers never talk to a source directly: a caller materializes the
//! sequence first, so file reads and subprocess calls stay outside the pure
//! computation and the analyzers can be tested with literal arrays.

use crate::error::{AuditError, Result};

/// How a source obtains its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Values held in memory.
    Memory,
    /// Values read from a plain-text file.
    File,
    /// Values written by an external generator process.
    Process,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
            Self::Process => write!(f, "process"),
        }
    }
}

/// Metadata about a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Identifier used in logs and errors (e.g. a generator name or a path).
    pub name: String,
    /// One-line human-readable description.
    pub description: String,
    pub kind: SourceKind,
}

/// Supplier of raw unsigned integers.
pub trait DataSource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Produce exactly `count` raw values for `seed`.
    ///
    /// Sources that cannot honour the seed (files, fixed arrays) ignore it.
    fn supply(&self, count: usize, seed: u64) -> Result<Vec<u64>>;

    /// Convenience: name from info.
    fn name(&self) -> &str {
        &self.info().name
    }
}

/// Ask `source` for `count` values and fail unless exactly that many arrive.
pub fn supply_exact(source: &dyn DataSource, count: usize, seed: u64) -> Result<Vec<u64>> {
    log::debug!(
        "requesting {count} values from {} source '{}' (seed {seed})",
        source.info().kind,
        source.name()
    );
    let values = source.supply(count, seed)?;
    if values.len() != count {
        return Err(AuditError::upstream(
            source.name(),
            format!("supplied {} values, {count} requested", values.len()),
        ));
    }
    Ok(values)
}
