use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::PipelineError;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error unless the directory already exists.
pub(crate) fn require_dir_exists(path: &Path) -> Result<(), PipelineError> {
    let not_dir = |msg: &str| PipelineError::io(path, std::io::Error::new(std::io::ErrorKind::NotFound, msg.to_string()));
    if !path.exists() { return Err(not_dir("directory does not exist")) }
    if !path.is_dir() { return Err(not_dir("path exists but is not a directory")) }
    Ok(())
}

/// Locate the single `.shp` file inside a boundary dataset directory.
pub(crate) fn find_shapefile(dir: &Path) -> Result<PathBuf, PipelineError> {
    require_dir_exists(dir)?;

    let mut found = WalkDir::new(dir)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp")));

    let first = found.next().ok_or_else(|| PipelineError::Shapefile {
        path: dir.to_path_buf(),
        reason: "no .shp file in directory".to_string(),
    })?;

    if let Some(second) = found.next() {
        return Err(PipelineError::Shapefile {
            path: dir.to_path_buf(),
            reason: format!("ambiguous boundary dataset: {} and {}", first.display(), second.display()),
        });
    }

    Ok(first)
}

/// Write-then-rename sink, so a failed run never leaves a truncated output behind.
pub(crate) struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    pub(crate) fn open(target: &Path) -> Result<Self> {
        let parent = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        ensure_dir_exists(parent)?;
        let tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("create temp file next to {}", target.display()))?;
        Ok(Self { target: target.to_path_buf(), tmp })
    }

    /// Flush, fsync and atomically move the temp file onto the target.
    pub(crate) fn finalize(mut self) -> Result<()> {
        self.tmp.flush()?;
        self.tmp.as_file().sync_all().ok(); // best-effort fsync file
        self.tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}
