//! claimmatch command-line entrypoint.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use claimmatch::config::Config;
use claimmatch::constants::MATCH_CACHE_FILENAME;
use claimmatch::corpus::group_by_corpus;
use claimmatch::extraction::ClaimExtractor;
use claimmatch::metrics::ClaimFilter;
use claimmatch::oracle::{ConcurrencyLimiter, build_oracle};
use claimmatch::pipeline::{self, EvaluationParams, MatchCollector};
use claimmatch::quality::QualityScorer;
use claimmatch::store::{self, ReportPaths};

use crate::cli::{Cli, Commands, ExtractArgs, MatchArgs, MetricsArgs, ScoreCitancesArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract(args) => extract(args).await,
        Commands::ScoreCitances(args) => score_citances(args).await,
        Commands::Match(args) => collect_matches(args).await,
        Commands::Metrics(args) => metrics(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(model: Option<String>) -> Result<Config> {
    let mut config = Config::from_env().context("invalid environment configuration")?;
    if let Some(model) = model {
        config.model = model;
    }
    Ok(config)
}

async fn extract(args: ExtractArgs) -> Result<()> {
    let mut config = load_config(args.model)?;
    config.max_concurrent_requests = args.max_concurrent_requests;
    config.validate()?;

    let oracle = build_oracle(&config)?;
    let extractor = ClaimExtractor::new(oracle, ConcurrencyLimiter::new(config.max_concurrent_requests));
    let added = extractor
        .extract_to_file(&args.papers, &args.output)
        .await
        .with_context(|| format!("claim extraction into {} failed", args.output.display()))?;

    info!(added, output = %args.output.display(), "Extraction finished");
    Ok(())
}

async fn score_citances(args: ScoreCitancesArgs) -> Result<()> {
    let mut config = load_config(args.model)?;
    if let Some(max) = args.max_concurrent_requests {
        config.max_concurrent_requests = max;
    }
    config.validate()?;

    let oracle = build_oracle(&config)?;
    let scorer = QualityScorer::new(oracle, ConcurrencyLimiter::new(config.max_concurrent_requests));
    let corpora = scorer.score_file(&args.citances, &args.output).await?;

    info!(corpora, output = %args.output.display(), "Citance scoring finished");
    Ok(())
}

async fn collect_matches(args: MatchArgs) -> Result<()> {
    let mut config = load_config(args.model)?;
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(max) = args.max_concurrent_requests {
        config.max_concurrent_requests = max;
    }
    if let Some(mode) = args.failure_mode {
        config.failure_mode = mode;
    }
    config.validate()?;

    let citances = store::load_citances(&args.citances)?;
    let claims = store::load_claims(&args.claims)?;
    let corpora = group_by_corpus(citances, claims);
    info!(
        corpora = corpora.len(),
        model = %config.model,
        batch_size = config.batch_size,
        max_concurrent_requests = config.max_concurrent_requests,
        failure_mode = %config.failure_mode,
        "Starting match collection"
    );

    let oracle = build_oracle(&config)?;
    let collector = MatchCollector::from_config(oracle, &config);
    let cache = collector.collect(&corpora).await;

    let path = args.output_dir.join(MATCH_CACHE_FILENAME);
    store::save_match_cache(&path, &cache)?;
    Ok(())
}

fn metrics(args: MetricsArgs) -> Result<()> {
    let cache = store::load_match_cache(&args.cache_file)?;
    let params = EvaluationParams {
        dm_threshold: args.dm_threshold,
        quality_threshold: args.quality_threshold,
        filter: ClaimFilter::from_flags(args.themes, args.sections),
    };
    info!(
        dm_threshold = params.dm_threshold,
        quality_threshold = params.quality_threshold,
        themes = ?params.filter.themes(),
        sections = ?params.filter.sections(),
        "Computing metrics"
    );

    let report = pipeline::run(&cache, &params);
    let paths = ReportPaths::new(
        &args.output_dir,
        &args.cache_file,
        params.dm_threshold,
        params.quality_threshold,
        &params.filter,
    );
    store::write_report(&report, &paths)?;

    println!(
        "average coverage: {:.4} ({} corpora), average precision: {:.4} ({} corpora)",
        report.summary.average_coverage,
        report.summary.coverage_corpus_count,
        report.summary.average_precision,
        report.summary.precision_corpus_count
    );
    Ok(())
}
