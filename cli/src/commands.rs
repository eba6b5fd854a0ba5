pub mod regions;
pub mod scan;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tagscan_common::config::{
    Config, DEFAULT_OUTPUT, DEFAULT_REGION, DEFAULT_REQUIRED_TAGS, RegionSelection, ReportPolicy,
};
use tagscan_common::provider::CloudProvider;
use tagscan_common::resource::{RequiredLabels, ResourceKind};
use tagscan_core::provider::{AwsCliProvider, SnapshotProvider};

#[derive(Parser)]
#[command(name = "tagscan")]
#[command(version, about = "Finds cloud resources missing required tags.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Named AWS CLI profile
    #[arg(long, global = true, env = "TAGSCAN_PROFILE")]
    pub profile: Option<String>,

    /// Read the inventory from a JSON snapshot instead of a live account
    #[arg(long, global = true, env = "TAGSCAN_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce terminal output (-q, -qq)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the account and report resources with missing tags
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// List the regions enabled for the account
    #[command(alias = "r")]
    Regions,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Tags every resource must carry, comma separated
    #[arg(long, env = "TAGSCAN_REQUIRE", default_value = DEFAULT_REQUIRED_TAGS)]
    pub require: String,

    /// missing-required or untagged-only
    #[arg(long, env = "TAGSCAN_POLICY", default_value = "missing-required")]
    pub policy: ReportPolicy,

    /// Regions to scan, repeated or comma separated
    #[arg(
        long = "region",
        env = "TAGSCAN_REGIONS",
        value_delimiter = ',',
        default_value = DEFAULT_REGION,
        conflicts_with = "all_regions"
    )]
    pub regions: Vec<String>,

    /// Scan every region enabled for the account
    #[arg(long)]
    pub all_regions: bool,

    /// Kinds listed directly after the tag index, or `all`
    #[arg(
        long = "fallback",
        env = "TAGSCAN_FALLBACKS",
        value_delimiter = ',',
        default_value = "ec2-instance,s3-bucket"
    )]
    pub fallbacks: Vec<String>,

    /// Report file, written as CSV
    #[arg(short, long, env = "TAGSCAN_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Append the local time to the report file name
    #[arg(long)]
    pub timestamp: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Live account through the AWS CLI unless a snapshot was given.
    pub fn provider(&self, home_region: &str) -> anyhow::Result<Arc<dyn CloudProvider>> {
        match &self.snapshot {
            Some(path) => {
                let snapshot = SnapshotProvider::load(path)
                    .with_context(|| format!("failed to load snapshot {}", path.display()))?;
                Ok(Arc::new(snapshot))
            }
            None => Ok(Arc::new(
                AwsCliProvider::new(home_region).with_profile(self.profile.clone()),
            )),
        }
    }
}

impl ScanArgs {
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let regions = if self.all_regions {
            RegionSelection::All
        } else {
            RegionSelection::List(
                self.regions
                    .iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect(),
            )
        };

        Ok(Config {
            required_tags: self.require.parse::<RequiredLabels>()?,
            policy: self.policy,
            regions,
            fallbacks: parse_fallbacks(&self.fallbacks)?,
            output: self.output.clone(),
            timestamp: self.timestamp,
        })
    }

    /// Region used for account-level calls.
    pub fn home_region(&self) -> &str {
        self.regions
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REGION)
    }
}

fn parse_fallbacks(values: &[String]) -> anyhow::Result<Vec<ResourceKind>> {
    let mut kinds: Vec<ResourceKind> = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if value.eq_ignore_ascii_case("all") {
            return Ok(ResourceKind::ALL.to_vec());
        }
        if value.eq_ignore_ascii_case("none") {
            continue;
        }
        let kind: ResourceKind = value
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("invalid --fallback value '{value}'"))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
