use std::sync::Arc;

use async_trait::async_trait;
use tagscan_common::discovery::{
    Discovered, DiscoverySource, ScanContext, SourcePriority, SourceScope,
};
use tagscan_common::provider::{CloudProvider, ProviderError};
use tagscan_common::resource::{Partition, ResourceKind, arn};
use tracing::{debug, warn};

/// Discovery through a kind-specific listing.
///
/// Listings return partial ids, so each one is synthesized into a full ARN with the
/// partition and account context. Records that cannot be synthesized are skipped.
/// When the listing does not carry tags, they are looked up per resource; a
/// "no tag set" answer counts as an empty label set.
pub struct FallbackSource {
    kind: ResourceKind,
    provider: Arc<dyn CloudProvider>,
}

impl FallbackSource {
    pub fn new(kind: ResourceKind, provider: Arc<dyn CloudProvider>) -> Self {
        Self { kind, provider }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[async_trait]
impl DiscoverySource for FallbackSource {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn priority(&self) -> SourcePriority {
        SourcePriority::Fallback
    }

    fn scope(&self) -> SourceScope {
        if self.kind.is_regional() {
            SourceScope::Regional
        } else {
            SourceScope::Global
        }
    }

    async fn fetch(
        &self,
        partition: &Partition,
        context: &ScanContext,
    ) -> Result<Vec<Discovered>, ProviderError> {
        let descriptors = self.provider.list_kind(self.kind, partition).await?;
        let mut discovered: Vec<Discovered> = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let partial: &str = descriptor.id.as_deref().unwrap_or_default();
            let id = match arn::synthesize(
                self.kind,
                partition.region_name(),
                context.account(),
                partial,
            ) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping {} record in {partition}: {e}", self.kind);
                    continue;
                }
            };

            let labels = match descriptor.labels {
                Some(labels) => labels,
                None => self
                    .provider
                    .lookup_tags(self.kind, partial, &id)
                    .await?
                    .into_labels(),
            };

            discovered.push(Discovered::new(id, labels));
        }

        debug!("{} listing returned {} resources in {partition}", self.kind, discovered.len());
        Ok(discovered)
    }
}
