use std::sync::Arc;

use async_trait::async_trait;
use tagscan_common::discovery::{
    Discovered, DiscoverySource, ScanContext, SourcePriority, SourceScope,
};
use tagscan_common::provider::{CloudProvider, ProviderError};
use tagscan_common::resource::Partition;
use tracing::debug;

/// Discovery through the provider-wide tag index.
///
/// Pages are drained until the provider stops returning a continuation token.
pub struct GenericTaggingSource {
    provider: Arc<dyn CloudProvider>,
}

impl GenericTaggingSource {
    pub const NAME: &'static str = "tag-index";

    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl DiscoverySource for GenericTaggingSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> SourcePriority {
        SourcePriority::Generic
    }

    fn scope(&self) -> SourceScope {
        SourceScope::Regional
    }

    async fn fetch(
        &self,
        partition: &Partition,
        _context: &ScanContext,
    ) -> Result<Vec<Discovered>, ProviderError> {
        let Some(region) = partition.region_name() else {
            return Ok(Vec::new());
        };

        let mut discovered: Vec<Discovered> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages: usize = 0;

        loop {
            let page = self.provider.tag_index_page(region, token.as_deref()).await?;
            pages += 1;

            discovered.extend(
                page.entries
                    .into_iter()
                    .map(|(id, labels)| Discovered::new(id, labels)),
            );

            match page.next_token {
                Some(next) if next.is_empty() => break,
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(ProviderError::InvalidResponse(format!(
                        "tag index returned the same continuation token twice in {region}"
                    )));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(
            "Tag index returned {} resources over {pages} page(s) in {region}",
            discovered.len()
        );
        Ok(discovered)
    }
}
