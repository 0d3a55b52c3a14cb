mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mclocalizer::config::Config;
use mclocalizer::explorer::ExplorerFactory;
use mclocalizer::git::{GitRepository, HistoryProvider};
use mclocalizer::inspection::{CommitReport, RepoInspector, ReportKind, scan_partitioned};
use mclocalizer::report::{self, CommitCsvWriter};
use mclocalizer::tracker::TargetTracker;
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_directive());

    let mut config = Config::new(args.config.as_deref(), &args.repo)?;
    args.apply_to(&mut config);
    config.validate()?;

    run(&args, &config)
}

/// Logs go to stderr; `RUST_LOG` wins over the verbosity flags
fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_inspector(
    args: &Args,
    config: &Config,
    explorers: &ExplorerFactory,
) -> mclocalizer::Result<RepoInspector<GitRepository>> {
    let repo = GitRepository::discover(&args.repo)?
        .with_walk_options(config.history.walk_options())
        .with_skip_trivial_lines(config.blame.skip_trivial_lines);

    let mut inspector = RepoInspector::new(
        repo,
        config.analysis.commit_filters()?,
        config.analysis.file_filters()?,
        explorers.build()?,
    )
    .keep_going(args.keep_going);
    if let Some(resolver) = config.blame.mode.resolver() {
        inspector = inspector.with_blame(resolver);
    }
    Ok(inspector)
}

fn progress_bar(total: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{msg}: {percent:>3}%|{wide_bar}|{pos}/{len} [{per_sec}]",
    ) {
        bar.set_style(style);
    }
    bar.set_message("Processing commits");
    bar
}

#[derive(Debug, Default)]
struct KindCounts {
    complete: usize,
    empty: usize,
    filtered: usize,
    error: usize,
}

impl KindCounts {
    fn add(&mut self, report: &CommitReport) {
        match report.kind {
            ReportKind::Complete => self.complete += 1,
            ReportKind::Empty => self.empty += 1,
            ReportKind::Filtered => self.filtered += 1,
            ReportKind::Error => self.error += 1,
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let explorers = config.analysis.target.explorer_factory()?;
    let mut inspector = build_inspector(args, config, &explorers)?;
    let ids = inspector.provider().commit_ids()?;
    let bar = progress_bar(ids.len(), args.quiet);

    let result_path = &config.output.result_path;
    let result_file = File::create(result_path)
        .with_context(|| format!("Failed to create {}", result_path.display()))?;
    let mut writer = CommitCsvWriter::new(
        BufWriter::new(result_file),
        config.blame.mode.resolver().is_some(),
        config.output.include_all_kinds,
    )?;

    let mut counts = KindCounts::default();
    let tracker = if config.history.jobs > 1 {
        drop(inspector);
        let scan = scan_partitioned(
            ids,
            config.history.jobs,
            || build_inspector(args, config, &explorers),
            |_| bar.inc(1),
        )?;
        for report in &scan.reports {
            counts.add(report);
            writer.write_report(report)?;
        }
        scan.tracker
    } else {
        let mut tracker = TargetTracker::new();
        for report in inspector.reports_for(ids) {
            let report = report?;
            counts.add(&report);
            writer.write_report(&report)?;
            tracker.collect(&report);
            bar.inc(1);
        }
        tracker
    };
    bar.finish_and_clear();
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", result_path.display()))?;

    tracing::info!(
        "{} complete, {} empty, {} filtered, {} errors; {} rows written to {}",
        counts.complete,
        counts.empty,
        counts.filtered,
        counts.error,
        writer.rows(),
        result_path.display()
    );

    let stats = tracker.gen_stats();
    if let Some(stats_path) = &config.output.stats_path {
        let file = File::create(stats_path)
            .with_context(|| format!("Failed to create {}", stats_path.display()))?;
        report::write_stats(&mut BufWriter::new(file), &stats)
            .with_context(|| format!("Failed to write {}", stats_path.display()))?;
        tracing::info!("Wrote {} targets to {}", stats.len(), stats_path.display());
    }

    for (identifier, count) in stats.iter().take(args.top) {
        println!("{:>6}  {}", count, identifier);
    }

    Ok(())
}
