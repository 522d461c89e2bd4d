//! Source backed by a plain-text file of raw generator output.

use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};
use crate::source::{DataSource, SourceInfo, SourceKind};
use crate::sources::text::read_raw_integers;
use crate::walk::BitWidth;

/// Reads one unsigned integer per line. The file must hold at least the
/// requested number of values; the first `count` are served.
pub struct FileSource {
    info: SourceInfo,
    path: PathBuf,
    bit_width: BitWidth,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, bit_width: BitWidth) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            info: SourceInfo {
                name: path.display().to_string(),
                description: format!("{bit_width}-bit integers read from file"),
                kind: SourceKind::File,
            },
            path,
            bit_width,
        }
    }
}

impl DataSource for FileSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn supply(&self, count: usize, _seed: u64) -> Result<Vec<u64>> {
        let mut values = read_raw_integers(&self.path, self.bit_width)?;
        if values.len() < count {
            return Err(AuditError::upstream(
                &self.info.name,
                format!("file holds {} values, {count} requested", values.len()),
            ));
        }
        if values.len() > count {
            log::debug!(
                "{}: using the first {count} of {} values",
                self.info.name,
                values.len()
            );
            values.truncate(count);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(lines: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_source_reads_prefix() {
        let file = fixture("5\n6\n7\n8\n");
        let source = FileSource::new(file.path(), BitWidth::W32);
        assert_eq!(source.supply(2, 0).unwrap(), vec![5, 6]);
        assert_eq!(source.supply(4, 0).unwrap(), vec![5, 6, 7, 8]);
        assert_eq!(source.info().kind, SourceKind::File);
        assert_eq!(source.info().description, "32-bit integers read from file");
    }

    #[test]
    fn test_file_source_too_short() {
        let file = fixture("5\n6\n");
        let source = FileSource::new(file.path(), BitWidth::W32);
        let err = source.supply(3, 0).unwrap_err();
        assert_eq!(err.kind(), "upstream_failure");
    }

    #[test]
    fn test_file_source_malformed_line() {
        let file = fixture("5\nsix\n");
        let source = FileSource::new(file.path(), BitWidth::W64);
        assert_eq!(source.supply(1, 0).unwrap_err().kind(), "invalid_input");
    }
}
