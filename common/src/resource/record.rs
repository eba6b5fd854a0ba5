use std::fmt;

use super::arn::ResourceId;
use super::labels::LabelSet;
use super::partition::Partition;

/// Marker written in place of a missing-label list for resources with no tags at all.
pub const NO_TAGS_MARKER: &str = "No Tags";

/// A reconciled resource that has not been classified yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub labels: LabelSet,
    pub partition: Partition,
}

impl Resource {
    pub fn new(id: ResourceId, labels: LabelSet, partition: Partition) -> Self {
        Self {
            id,
            labels,
            partition,
        }
    }
}

/// What a reported resource lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelGap {
    /// Required keys absent from the label set, in configured order. Never empty.
    Missing(Vec<String>),
    /// The resource carries no labels and there was no required key to list.
    NoTags,
}

impl LabelGap {
    pub fn missing(&self) -> &[String] {
        match self {
            Self::Missing(keys) => keys,
            Self::NoTags => &[],
        }
    }
}

impl fmt::Display for LabelGap {
    /// Comma-joined missing keys, or the "No Tags" marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(keys) => f.write_str(&keys.join(", ")),
            Self::NoTags => f.write_str(NO_TAGS_MARKER),
        }
    }
}

/// Final, immutable result for one non-compliant resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    resource: Resource,
    gap: LabelGap,
}

impl InventoryRecord {
    pub fn new(resource: Resource, gap: LabelGap) -> Self {
        Self { resource, gap }
    }

    pub fn id(&self) -> &ResourceId {
        &self.resource.id
    }

    pub fn labels(&self) -> &LabelSet {
        &self.resource.labels
    }

    pub fn partition(&self) -> &Partition {
        &self.resource.partition
    }

    pub fn gap(&self) -> &LabelGap {
        &self.gap
    }

    /// Service segment of the ARN, or `"unknown"` when the identifier does not parse.
    pub fn service(&self) -> &str {
        self.resource
            .id
            .arn()
            .map(|arn| arn.service)
            .unwrap_or("unknown")
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
