use crate::terminal::colors;
use colored::*;
use tagscan_common::config::RegionSelection;
use tagscan_common::resource::{InventoryRecord, LabelGap, ResourceKind};

pub type Detail = (String, ColoredString);

pub fn record_to_details(record: &InventoryRecord) -> Vec<Detail> {
    let gap: Detail = match record.gap() {
        LabelGap::NoTags => ("Tags".to_string(), record.gap().to_string().color(colors::NO_TAGS).bold()),
        LabelGap::Missing(_) => ("Missing".to_string(), record.gap().to_string().color(colors::MISSING)),
    };

    let mut details: Vec<Detail> = vec![gap];

    if !record.labels().is_empty() {
        let present: String = record.labels().keys().collect::<Vec<_>>().join(", ");
        details.push(("Present".to_string(), present.normal()));
    }

    details.push((
        "Region".to_string(),
        record.partition().to_string().color(colors::REGION),
    ));
    details.push(("Service".to_string(), record.service().normal()));
    details
}

pub fn regions_label(regions: &RegionSelection) -> String {
    match regions {
        RegionSelection::All => "all enabled".to_string(),
        RegionSelection::List(list) => list.join(", "),
    }
}

pub fn kinds_label(kinds: &[ResourceKind]) -> String {
    if kinds.is_empty() {
        return "none".to_string();
    }
    kinds
        .iter()
        .map(ResourceKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
