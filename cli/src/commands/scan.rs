use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, warn};

use crate::terminal::{colors, format, print, spinner};
use crate::tprint;
use tagscan_common::config::Config;
use tagscan_common::provider::CloudProvider;
use tagscan_common::resource::InventoryRecord;
use tagscan_common::success;
use tagscan_core::report::{self, CsvReport, ReportSink};
use tagscan_core::scanner::{ScanOutcome, ScanService};

pub const EXIT_DEGRADED: u8 = 2;

pub async fn scan(
    provider: Arc<dyn CloudProvider>,
    cfg: &Config,
    quiet: u8,
) -> anyhow::Result<ExitCode> {
    print_settings(cfg, quiet);

    let span = spinner::scan_span();
    let progress_span = span.clone();
    let service = ScanService::from_config(provider, cfg).with_progress(Box::new(move |p| {
        spinner::report_partition(&progress_span, p)
    }));

    let start_time: Instant = Instant::now();
    let outcome: ScanOutcome = service.run(cfg).instrument(span.clone()).await?;
    drop(service);
    drop(span);

    let written: Option<PathBuf> = write_report(&outcome.findings, cfg)?;
    scan_ends(&outcome, written, start_time.elapsed(), quiet);

    if outcome.is_degraded() {
        Ok(ExitCode::from(EXIT_DEGRADED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_settings(cfg: &Config, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let required: String = cfg.required_tags.iter().collect::<Vec<_>>().join(", ");
    let policy: String = cfg.policy.to_string();
    let regions: String = format::regions_label(&cfg.regions);
    let fallbacks: String = format::kinds_label(&cfg.fallbacks);

    print::set_key_width(["Required", "Policy", "Regions", "Fallbacks"]);
    print::aligned_line("Required", if required.is_empty() { "none".to_string() } else { required });
    print::aligned_line("Policy", policy);
    print::aligned_line("Regions", regions);
    print::aligned_line("Fallbacks", fallbacks);
    tprint!();
}

fn write_report(findings: &[InventoryRecord], cfg: &Config) -> anyhow::Result<Option<PathBuf>> {
    let path: PathBuf = if cfg.timestamp {
        report::timestamped_path(&cfg.output, &report::local_stamp())
    } else {
        cfg.output.clone()
    };

    CsvReport::new(path)
        .write(&report::rows(findings))
        .context("failed to write the report")
}

/// How a finished scan is announced.
#[derive(Debug, PartialEq, Eq)]
enum Completion {
    Report(PathBuf),
    Compliant,
    /// No findings, but some sources failed.
    Incomplete,
}

fn completion(outcome: &ScanOutcome, written: Option<PathBuf>) -> Completion {
    match written {
        Some(path) => Completion::Report(path),
        None if outcome.is_degraded() => Completion::Incomplete,
        None => Completion::Compliant,
    }
}

fn scan_ends(outcome: &ScanOutcome, written: Option<PathBuf>, total_time: Duration, quiet: u8) {
    match (outcome.is_compliant(), outcome.is_degraded()) {
        (true, false) => print::header("all clear", quiet),
        (true, true) => print::header("incomplete scan", quiet),
        (false, _) => {
            print::header("missing tags", quiet);
            print_findings(&outcome.findings, quiet);
        }
    }

    print_failures(outcome);
    print_summary(outcome, total_time, quiet);

    match completion(outcome, written) {
        Completion::Report(path) => success!("Report written to {}", path.display()),
        Completion::Compliant => success!("All resources have the required tags."),
        Completion::Incomplete => warn!("No findings in the partitions that completed"),
    }
}

fn print_findings(findings: &[InventoryRecord], quiet: u8) {
    if quiet > 1 {
        return;
    }

    for (idx, record) in findings.iter().enumerate() {
        print::tree_head(idx, record.id().as_str());
        print::as_tree_one_level(format::record_to_details(record));
        if idx + 1 != findings.len() {
            tprint!();
        }
    }
}

fn print_failures(outcome: &ScanOutcome) {
    for failure in &outcome.failures {
        warn!(
            "{} contributed nothing for {}: {}",
            failure.source, failure.partition, failure.error
        );
    }
}

fn print_summary(outcome: &ScanOutcome, total_time: Duration, quiet: u8) {
    let resources: ColoredString = format!("{} resources", outcome.inventory_size).bold().green();
    let flagged: ColoredString = format!("{} flagged", outcome.findings.len()).bold().yellow();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Scan Complete: {resources} checked, {flagged} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            tprint!();
            success!("{}", output)
        }
    }

    if outcome.is_degraded() {
        warn!(
            "{} source(s) failed; the report may be incomplete",
            outcome.failures.len()
        );
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
