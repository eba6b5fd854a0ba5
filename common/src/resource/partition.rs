use std::fmt;

use serde::{Deserialize, Serialize};

/// Scope a resource was discovered under.
///
/// Only used for reporting. It never takes part in identity or deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Resources addressed without a region (S3, IAM, CloudFront, Route 53).
    Global,
    Region(String),
}

impl Partition {
    pub fn region(name: impl Into<String>) -> Self {
        Self::Region(name.into())
    }

    /// Region name, `None` for [`Partition::Global`].
    pub fn region_name(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Region(name) => Some(name),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("Global"),
            Self::Region(name) => f.write_str(name),
        }
    }
}
