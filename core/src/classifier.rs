//! Label-gap classification.
//!
//! `missing = required - keys(labels)`. A resource is reported when it has no
//! labels at all or when `missing` is non-empty. An untagged resource is reported
//! even with an empty required set, carrying the "No Tags" marker instead of an
//! empty key list.

use tagscan_common::config::ReportPolicy;
use tagscan_common::resource::{InventoryRecord, LabelGap, RequiredLabels, Resource};

pub struct GapClassifier {
    required: RequiredLabels,
    policy: ReportPolicy,
}

impl GapClassifier {
    pub fn new(required: RequiredLabels, policy: ReportPolicy) -> Self {
        Self { required, policy }
    }

    pub fn required(&self) -> &RequiredLabels {
        &self.required
    }

    /// Returns the finalized record if `resource` belongs in the report.
    pub fn classify(&self, resource: Resource) -> Option<InventoryRecord> {
        match self.policy {
            ReportPolicy::MissingRequired => classify(resource, &self.required),
            ReportPolicy::UntaggedOnly => resource
                .labels
                .is_empty()
                .then(|| InventoryRecord::new(resource, LabelGap::NoTags)),
        }
    }

    pub fn classify_all<I>(&self, resources: I) -> Vec<InventoryRecord>
    where
        I: IntoIterator<Item = Resource>,
    {
        resources
            .into_iter()
            .filter_map(|resource| self.classify(resource))
            .collect()
    }
}

/// Classifies one resource against `required`.
pub fn classify(resource: Resource, required: &RequiredLabels) -> Option<InventoryRecord> {
    let missing: Vec<String> = required.missing_from(&resource.labels);

    let gap = match (resource.labels.is_empty(), missing.is_empty()) {
        (true, true) => LabelGap::NoTags,
        (_, false) => LabelGap::Missing(missing),
        (false, true) => return None,
    };

    Some(InventoryRecord::new(resource, gap))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
