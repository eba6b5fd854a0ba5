//! # Tag Scan Service
//!
//! Implements the core "Tag Scan" use case.
//!
//! The service owns the discovery sources for one run and drives them partition
//! by partition:
//! 1. **Context**: resolves the caller account and the region list.
//! 2. **Discovery**: per region, the tag index first, then regional fallbacks;
//!    finally the global fallbacks under [`Partition::Global`].
//! 3. **Reconciliation**: first sighting of an identifier wins.
//! 4. **Classification**: keeps the resources with a label gap.
//!
//! A source that fails in one partition is logged and skipped; the rest of the
//! scan carries on and the failure is listed in the [`ScanOutcome`].

use std::sync::Arc;

use anyhow::Context;
use tagscan_common::config::{Config, RegionSelection};
use tagscan_common::discovery::{DiscoverySource, ScanContext};
use tagscan_common::provider::{CloudProvider, ProviderError};
use tagscan_common::resource::{InventoryRecord, Partition};
use tracing::{debug, error, info};

use crate::classifier::GapClassifier;
use crate::reconciler::{Batch, Reconciler};
use crate::sources;

type ProgressCallback = Box<dyn Fn(&Partition) + Send + Sync>;

/// A source that could not contribute to one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub partition: Partition,
    pub error: ProviderError,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub account_id: String,
    pub partitions: Vec<Partition>,
    /// Distinct resources after reconciliation.
    pub inventory_size: usize,
    /// Sightings dropped because another source reported the resource first.
    pub duplicates: usize,
    pub findings: Vec<InventoryRecord>,
    pub failures: Vec<SourceFailure>,
}

impl ScanOutcome {
    /// True when at least one source/partition contributed nothing because it failed.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_compliant(&self) -> bool {
        self.findings.is_empty()
    }
}

pub struct ScanService {
    provider: Arc<dyn CloudProvider>,
    sources: Vec<Box<dyn DiscoverySource>>,
    on_partition: Option<ProgressCallback>,
}

impl ScanService {
    /// Sources are kept in priority order; ties keep the order given.
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        mut sources: Vec<Box<dyn DiscoverySource>>,
    ) -> Self {
        sources.sort_by_key(|source| source.priority());
        Self {
            provider,
            sources,
            on_partition: None,
        }
    }

    /// Tag index plus the fallback kinds named in `cfg`.
    pub fn from_config(provider: Arc<dyn CloudProvider>, cfg: &Config) -> Self {
        let sources = sources::standard_sources(provider.clone(), &cfg.fallbacks);
        Self::new(provider, sources)
    }

    /// Called before each partition is scanned.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_partition = Some(callback);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Ordered partitions to scan: the selected regions, then Global.
    pub async fn plan(&self, regions: &RegionSelection) -> anyhow::Result<Vec<Partition>> {
        let regions: Vec<String> = match regions {
            RegionSelection::All => self
                .provider
                .list_regions()
                .await
                .context("failed to enumerate regions")?,
            RegionSelection::List(regions) => regions.clone(),
        };

        let mut partitions: Vec<Partition> = Vec::with_capacity(regions.len() + 1);
        for region in regions {
            let partition = Partition::Region(region);
            if !partitions.contains(&partition) {
                partitions.push(partition);
            }
        }
        partitions.push(Partition::Global);

        Ok(partitions)
    }

    /// Executes a full tag scan as described by `cfg`.
    pub async fn run(&self, cfg: &Config) -> anyhow::Result<ScanOutcome> {
        cfg.validate()?;

        let account_id: String = self
            .provider
            .account_id()
            .await
            .context("failed to resolve the caller account")?;
        let context = ScanContext::new(account_id.clone());
        let partitions: Vec<Partition> = self.plan(&cfg.regions).await?;

        info!(
            "Scanning account {account_id} across {} partition(s)",
            partitions.len()
        );

        let (reconciler, failures) = self.discover(&partitions, &context).await;
        let duplicates: usize = reconciler.duplicates();
        let inventory: Vec<_> = reconciler.finish();
        let inventory_size: usize = inventory.len();

        let classifier = GapClassifier::new(cfg.required_tags.clone(), cfg.policy);
        let findings: Vec<InventoryRecord> = classifier.classify_all(inventory);

        info!(
            "Reconciled {inventory_size} resources ({duplicates} duplicate sightings dropped), {} need attention",
            findings.len()
        );

        Ok(ScanOutcome {
            account_id,
            partitions,
            inventory_size,
            duplicates,
            findings,
            failures,
        })
    }

    /// Runs every source in every partition it covers and reconciles the results.
    pub async fn discover(
        &self,
        partitions: &[Partition],
        context: &ScanContext,
    ) -> (Reconciler, Vec<SourceFailure>) {
        let mut reconciler = Reconciler::new();
        let mut failures: Vec<SourceFailure> = Vec::new();

        for partition in partitions {
            if let Some(callback) = &self.on_partition {
                callback(partition);
            }

            for source in self.sources.iter().filter(|s| s.scope().covers(partition)) {
                match source.fetch(partition, context).await {
                    Ok(items) => {
                        let found: usize = items.len();
                        let accepted = reconciler.absorb(Batch::new(
                            source.name(),
                            partition.clone(),
                            items,
                        ));
                        debug!(
                            "{} in {partition}: {found} found, {accepted} new",
                            source.name()
                        );
                    }
                    Err(e) => {
                        error!("{} failed in {partition}: {e}", source.name());
                        failures.push(SourceFailure {
                            source: source.name().to_string(),
                            partition: partition.clone(),
                            error: e,
                        });
                    }
                }
            }
        }

        (reconciler, failures)
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
