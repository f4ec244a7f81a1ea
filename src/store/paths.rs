use std::path::{Path, PathBuf};

use crate::metrics::ClaimFilter;

/// Output locations of one metric run.
///
/// Names encode the thresholds and active filters, e.g.
/// `eval_cache_filtered_detailed_coverage_dm_6.0_cscore_8.0_themes_novelty.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub coverage: PathBuf,
    pub precision: PathBuf,
    pub scores: PathBuf,
}

impl ReportPaths {
    pub fn new(
        output_dir: &Path,
        cache_file: &Path,
        dm_threshold: f64,
        quality_threshold: f64,
        filter: &ClaimFilter,
    ) -> Self {
        let stem = cache_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "eval_cache".to_string());
        let suffix = format!(
            "dm_{}_cscore_{}{}.json",
            format_threshold(dm_threshold),
            format_threshold(quality_threshold),
            filter.file_tag()
        );

        Self {
            coverage: output_dir.join(format!("{stem}_detailed_coverage_{suffix}")),
            precision: output_dir.join(format!("{stem}_detailed_precision_{suffix}")),
            scores: output_dir.join(format!("{stem}_scores_{suffix}")),
        }
    }
}

/// Renders a threshold so integral values keep one decimal (`6` -> `6.0`).
pub fn format_threshold(value: f64) -> String {
    format!("{value:?}")
}
