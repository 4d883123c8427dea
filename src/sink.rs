// Write sinks for the emitted artifact.

use crate::error::{GenerateError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub trait Sink {
    /// Replace whatever is at `path` with `content`, all or nothing.
    fn write(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// Writes through a temporary file in the target directory, then renames it
/// over the target. The output directory must already exist.
#[derive(Debug, Default)]
pub struct FileSink;

impl Sink for FileSink {
    fn write(&mut self, path: &Path, content: &str) -> Result<()> {
        let write_err = |source: std::io::Error| GenerateError::Write { path: path.to_path_buf(), source };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_sink_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".stub.php");
        fs::write(&path, "old contents that are longer").expect("seed");

        FileSink.write(&path, "new").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1, "no temp file left behind");
    }

    #[test]
    fn test_missing_directory_is_write_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join(".stub.php");

        let err = FileSink.write(&path, "x").unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
        assert_eq!(err.stage(), "write");
        assert!(!path.exists());
    }
}
