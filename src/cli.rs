use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use claimmatch::constants::{
    DEFAULT_DM_THRESHOLD, DEFAULT_EXTRACTION_CONCURRENCY, DEFAULT_QUALITY_THRESHOLD,
};
use claimmatch::matching::FailureMode;

#[derive(Parser, Debug)]
#[command(
    name = "claimmatch",
    version,
    about = "Match extracted paper claims against citances and score coverage/precision"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract claims from paper texts.
    Extract(ExtractArgs),
    /// Rate citance quality (0-10).
    ScoreCitances(ScoreCitancesArgs),
    /// Collect claim/citance matches into a match cache.
    Match(MatchArgs),
    /// Compute coverage and precision from a match cache.
    Metrics(MetricsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub papers: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_EXTRACTION_CONCURRENCY)]
    pub max_concurrent_requests: usize,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreCitancesArgs {
    #[arg(long)]
    pub citances: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    #[arg(long)]
    pub citances: PathBuf,

    #[arg(long)]
    pub claims: PathBuf,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub failure_mode: Option<FailureMode>,
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    #[arg(long)]
    pub cache_file: PathBuf,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, alias = "threshold", default_value_t = DEFAULT_DM_THRESHOLD)]
    pub dm_threshold: f64,

    #[arg(
        long,
        aliases = ["c-score-threshold", "c_score_threshold"],
        default_value_t = DEFAULT_QUALITY_THRESHOLD
    )]
    pub quality_threshold: f64,

    /// Keep only claims with this theme (repeatable, case-insensitive).
    #[arg(long = "theme")]
    pub themes: Vec<String>,

    /// Keep only claims from this section (repeatable, case-insensitive).
    #[arg(long = "section")]
    pub sections: Vec<String>,
}
