use colored::*;
use indicatif::ProgressStyle;
use tagscan_common::resource::Partition;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Span that carries the spinner for the duration of a scan.
pub fn scan_span() -> Span {
    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&spinner_style());
    span.pb_set_message("Resolving account...");
    span
}

pub fn report_partition(span: &Span, partition: &Partition) {
    let message: String = format!(
        "Scanning {}...",
        partition.to_string().color(colors::REGION).bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string();
    span.pb_set_message(&message);
}
