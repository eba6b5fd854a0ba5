//! Defines the contract for the cloud provider capability a scan consumes.
//!
//! Implementations (the AWS CLI adapter, the offline snapshot) live in `tagscan-core`.
//! Every call maps one provider endpoint; pagination, identifier synthesis and
//! deduplication are handled by the discovery sources built on top of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::{LabelSet, Partition, ResourceId, ResourceKind};

/// Errors originating from the external provider API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One page of the provider-wide tag index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndexPage {
    pub entries: Vec<(ResourceId, LabelSet)>,
    /// Continuation token. `None` once the index is exhausted.
    pub next_token: Option<String>,
}

/// Raw item from a kind listing.
///
/// `id` is whatever the listing exposes (bare instance id, bucket name, zone path).
/// `labels` is set only when the listing reports tags inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDescriptor {
    pub id: Option<String>,
    #[serde(default)]
    pub labels: Option<LabelSet>,
}

impl KindDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }
}

/// Outcome of a kind-specific tag lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    Labels(LabelSet),
    /// The provider reports that the resource has no tag set at all.
    NoLabels,
}

impl TagLookup {
    pub fn into_labels(self) -> LabelSet {
        match self {
            Self::Labels(labels) => labels,
            Self::NoLabels => LabelSet::new(),
        }
    }
}

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Account id of the caller, used to synthesize account-scoped ARNs.
    async fn account_id(&self) -> Result<String, ProviderError>;

    /// Regions enabled for the account.
    async fn list_regions(&self) -> Result<Vec<String>, ProviderError>;

    /// Fetches one page of the tag index for `region`, continuing from `token`.
    async fn tag_index_page(
        &self,
        region: &str,
        token: Option<&str>,
    ) -> Result<TagIndexPage, ProviderError>;

    /// Lists every resource of `kind` visible in `partition`.
    async fn list_kind(
        &self,
        kind: ResourceKind,
        partition: &Partition,
    ) -> Result<Vec<KindDescriptor>, ProviderError>;

    /// Looks up the tags of one resource whose listing did not carry them.
    ///
    /// `partial` is the id from the listing; `id` is its synthesized ARN.
    async fn lookup_tags(
        &self,
        kind: ResourceKind,
        partial: &str,
        id: &ResourceId,
    ) -> Result<TagLookup, ProviderError>;
}
