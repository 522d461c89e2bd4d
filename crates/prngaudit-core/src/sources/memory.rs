//! In-memory source over a fixed sequence.

use crate::error::{AuditError, Result};
use crate::source::{DataSource, SourceInfo, SourceKind};

/// Serves the first `count` values of a fixed sequence; the seed is ignored.
pub struct MemorySource {
    info: SourceInfo,
    values: Vec<u64>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, values: Vec<u64>) -> Self {
        Self {
            info: SourceInfo {
                name: name.into(),
                description: format!("{} literal values", values.len()),
                kind: SourceKind::Memory,
            },
            values,
        }
    }
}

impl DataSource for MemorySource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn supply(&self, count: usize, _seed: u64) -> Result<Vec<u64>> {
        if self.values.len() < count {
            return Err(AuditError::upstream(
                &self.info.name,
                format!("holds {} values, {count} requested", self.values.len()),
            ));
        }
        Ok(self.values[..count].to_vec())
    }
}
