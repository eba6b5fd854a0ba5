use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::resource::{RequiredLabels, ResourceKind};

pub const DEFAULT_REQUIRED_TAGS: &str = "AppName,AppCode";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_OUTPUT: &str = "missing_tags_report.csv";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no regions selected")]
    NoRegions,
    #[error("invalid region name '{0}'")]
    InvalidRegion(String),
    #[error("unknown report policy '{0}' (expected 'missing-required' or 'untagged-only')")]
    UnknownPolicy(String),
}

/// Which resources end up in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportPolicy {
    /// Resources lacking any required label, plus every untagged resource.
    #[default]
    MissingRequired,
    /// Only resources carrying no labels at all.
    UntaggedOnly,
}

impl FromStr for ReportPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing-required" | "missing" => Ok(Self::MissingRequired),
            "untagged-only" | "untagged" => Ok(Self::UntaggedOnly),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ReportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => f.write_str("missing-required"),
            Self::UntaggedOnly => f.write_str("untagged-only"),
        }
    }
}

/// Regions to scan, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
    /// Every region the provider reports as enabled.
    All,
    List(Vec<String>),
}

impl Default for RegionSelection {
    fn default() -> Self {
        Self::List(vec![DEFAULT_REGION.to_string()])
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub required_tags: RequiredLabels,
    pub policy: ReportPolicy,
    pub regions: RegionSelection,
    /// Kinds that get a dedicated fallback listing after the tag index.
    pub fallbacks: Vec<ResourceKind>,
    pub output: PathBuf,
    /// Appends a `_YYYYmmdd_HHMMSS` stamp to the output file name.
    pub timestamp: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_tags: RequiredLabels::new(DEFAULT_REQUIRED_TAGS.split(',')),
            policy: ReportPolicy::default(),
            regions: RegionSelection::default(),
            fallbacks: vec![ResourceKind::Ec2Instance, ResourceKind::S3Bucket],
            output: PathBuf::from(DEFAULT_OUTPUT),
            timestamp: false,
        }
    }
}

impl Config {
    /// Rejects selections that cannot produce a meaningful scan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let RegionSelection::List(regions) = &self.regions {
            if regions.is_empty() {
                return Err(ConfigError::NoRegions);
            }
            if let Some(bad) = regions.iter().find(|r| !is_region_name(r)) {
                return Err(ConfigError::InvalidRegion(bad.clone()));
            }
        }
        Ok(())
    }
}

/// Loose shape check: lowercase letters, digits and dashes, e.g. `eu-west-1`.
fn is_region_name(s: &str) -> bool {
    !s.is_empty()
        && s.contains('-')
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
