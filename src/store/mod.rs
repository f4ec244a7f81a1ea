//! JSON artifacts on disk: inputs, the match cache and the metric reports.
//!
//! Every write goes to a temporary file in the destination directory first and is then renamed
//! over the target, so readers never observe a half-written file.

pub mod error;
pub mod paths;


pub use error::{StoreError, StoreResult};
pub use paths::{ReportPaths, format_threshold};

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::corpus::{CitancesEntry, ClaimsEntry};
use crate::pipeline::{EvaluationReport, MatchCache};

/// Reads a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a list of records stored either as a JSON array or as JSON lines.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    };

    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw).map_err(parse_err);
    }

    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(parse_err))
        .collect()
}

/// Writes `value` as pretty JSON, atomically replacing `path`.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush().map_err(write_err)?;
    }
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), "Wrote JSON file");
    Ok(())
}

/// Creates `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> StoreResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|_| StoreError::DirCreationFailed {
            path: dir.to_path_buf(),
        })?;
    }
    Ok(())
}

/// Loads a claims export (`[{corpusid, claims}]`).
pub fn load_claims(path: &Path) -> StoreResult<Vec<ClaimsEntry>> {
    load_records(path)
}

/// Loads a citances export (`[{corpusId, citances}]`).
pub fn load_citances(path: &Path) -> StoreResult<Vec<CitancesEntry>> {
    load_records(path)
}

pub fn load_match_cache(path: &Path) -> StoreResult<MatchCache> {
    let cache: MatchCache = load_json(path)?;
    info!(path = %path.display(), corpora = cache.len(), "Loaded match cache");
    Ok(cache)
}

pub fn save_match_cache(path: &Path, cache: &MatchCache) -> StoreResult<()> {
    save_json(path, cache)?;
    info!(path = %path.display(), corpora = cache.len(), "Saved match cache");
    Ok(())
}

/// Writes the detailed coverage, detailed precision and summary files.
pub fn write_report(report: &EvaluationReport, paths: &ReportPaths) -> StoreResult<()> {
    save_json(&paths.coverage, &report.coverage_report)?;
    save_json(&paths.precision, &report.precision_report)?;
    save_json(&paths.scores, &report.summary)?;
    info!(
        coverage = %paths.coverage.display(),
        precision = %paths.precision.display(),
        scores = %paths.scores.display(),
        "Saved metric reports"
    );
    Ok(())
}
