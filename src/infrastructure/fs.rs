//! File-based entry points.
//!
//! Wraps the core text transform with file I/O: the source is read fully,
//! the result is written to a temp file in the destination directory and
//! renamed over the target, so a failed run never leaves a partially
//! written destination behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::application::Normalizer;
use crate::infrastructure::error::{InfraError, InfraResult};

/// Normalize `source` into `dest`, overwriting an existing destination.
#[instrument(level = "debug", skip(normalizer))]
pub fn normalize_file(normalizer: &Normalizer, source: &Path, dest: &Path) -> InfraResult<()> {
    let input = fs::read_to_string(source)
        .map_err(|e| InfraError::io(format!("reading {}", source.display()), e))?;
    let output = normalizer.normalize_str(&input)?;
    write_atomic(dest, &output)
}

/// Report whether `source` is already in canonical form.
pub fn is_canonical(normalizer: &Normalizer, source: &Path) -> InfraResult<bool> {
    let input = fs::read_to_string(source)
        .map_err(|e| InfraError::io(format!("reading {}", source.display()), e))?;
    let output = normalizer.normalize_str(&input)?;
    Ok(input == output)
}

/// Result of a batch run over a directory tree.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Files rewritten because they were not canonical yet.
    pub changed: Vec<PathBuf>,
    /// Files already in canonical form, left untouched.
    pub unchanged: Vec<PathBuf>,
}

/// Normalize every `*.{ext}` file under `dir` in place.
///
/// Files are independent documents, so they are processed in parallel;
/// the compiled pipeline is shared read-only across workers. The first
/// error aborts the batch.
#[instrument(level = "debug", skip(normalizer))]
pub fn normalize_batch(normalizer: &Normalizer, dir: &Path, ext: &str) -> InfraResult<BatchOutcome> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            InfraError::io(
                format!("walking {}", dir.display()),
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error")),
            )
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|x| x == ext)
        {
            files.push(entry.path().to_path_buf());
        }
    }
    debug!("batch: {} candidate files", files.len());

    let results: Vec<InfraResult<(PathBuf, bool)>> = files
        .par_iter()
        .map(|path| {
            let input = fs::read_to_string(path)
                .map_err(|e| InfraError::io(format!("reading {}", path.display()), e))?;
            let output = normalizer.normalize_str(&input)?;
            if input == output {
                return Ok((path.clone(), false));
            }
            write_atomic(path, &output)?;
            Ok((path.clone(), true))
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        let (path, changed) = result?;
        if changed {
            outcome.changed.push(path);
        } else {
            outcome.unchanged.push(path);
        }
    }
    Ok(outcome)
}

/// Write via temp file + rename so failures cannot truncate the target.
fn write_atomic(dest: &Path, content: &str) -> InfraResult<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| InfraError::io(format!("creating temp file in {}", dir.display()), e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| InfraError::io(format!("writing {}", dest.display()), e))?;
    tmp.persist(dest)
        .map_err(|e| InfraError::io(format!("replacing {}", dest.display()), e.error))?;
    Ok(())
}
