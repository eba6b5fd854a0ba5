//! Offline provider backed by an in-memory inventory.
//!
//! Loadable from a JSON snapshot so an audit can be replayed without credentials:
//!
//! ```json
//! {
//!   "account_id": "123456789012",
//!   "regions": {
//!     "us-east-1": {
//!       "tag_index": [{ "arn": "arn:aws:sqs:us-east-1:123456789012:jobs", "tags": { "AppName": "jobs" } }],
//!       "resources": { "ec2-instance": [{ "id": "i-0abc", "tags": {} }] }
//!     }
//!   },
//!   "global": { "s3-bucket": [{ "id": "logs" }] }
//! }
//! ```
//!
//! Listings of kinds that report tags inline (EC2) hand back their tags directly;
//! every other kind answers through [`CloudProvider::lookup_tags`], where an item
//! without `tags` reads as "no tag set".

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tagscan_common::provider::{
    CloudProvider, KindDescriptor, ProviderError, TagIndexPage, TagLookup,
};
use tagscan_common::resource::{LabelSet, Partition, ResourceId, ResourceKind};

const DEFAULT_PAGE_SIZE: usize = 100;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Deserialize)]
struct TaggedArn {
    arn: ResourceId,
    #[serde(default)]
    tags: LabelSet,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    tags: Option<LabelSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegionSnapshot {
    #[serde(default)]
    tag_index: Vec<TaggedArn>,
    #[serde(default)]
    resources: BTreeMap<ResourceKind, Vec<SnapshotItem>>,
}

/// Call a failure can be injected into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FailurePoint {
    Account,
    Regions,
    TagIndex(String),
    Kind(ResourceKind),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotProvider {
    account_id: String,
    #[serde(default)]
    regions: BTreeMap<String, RegionSnapshot>,
    #[serde(default)]
    global: BTreeMap<ResourceKind, Vec<SnapshotItem>>,
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(skip)]
    failures: HashMap<FailurePoint, ProviderError>,
}

impl SnapshotProvider {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            regions: BTreeMap::new(),
            global: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            failures: HashMap::new(),
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let snapshot: Self = serde_json::from_str(json).context("invalid inventory snapshot")?;
        anyhow::ensure!(snapshot.page_size > 0, "snapshot page_size must be positive");
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Sets how many tag index entries are returned per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Declares a region with nothing in it.
    pub fn add_region(&mut self, region: &str) {
        self.regions.entry(region.to_string()).or_default();
    }

    /// Adds a tag index entry for `region`.
    pub fn tag(&mut self, region: &str, arn: &str, labels: LabelSet) {
        self.regions
            .entry(region.to_string())
            .or_default()
            .tag_index
            .push(TaggedArn {
                arn: ResourceId::new(arn),
                tags: labels,
            });
    }

    /// Adds an item to the `kind` listing of `partition`.
    ///
    /// `tags: None` makes the tag lookup answer "no tag set".
    pub fn resource(
        &mut self,
        partition: Partition,
        kind: ResourceKind,
        id: Option<&str>,
        tags: Option<LabelSet>,
    ) {
        let item = SnapshotItem {
            id: id.map(str::to_string),
            tags,
        };
        let listing = match partition {
            Partition::Global => self.global.entry(kind).or_default(),
            Partition::Region(region) => self
                .regions
                .entry(region)
                .or_default()
                .resources
                .entry(kind)
                .or_default(),
        };
        listing.push(item);
    }

    pub fn fail_account(&mut self, error: ProviderError) {
        self.failures.insert(FailurePoint::Account, error);
    }

    pub fn fail_regions(&mut self, error: ProviderError) {
        self.failures.insert(FailurePoint::Regions, error);
    }

    pub fn fail_tag_index(&mut self, region: &str, error: ProviderError) {
        self.failures
            .insert(FailurePoint::TagIndex(region.to_string()), error);
    }

    pub fn fail_kind(&mut self, kind: ResourceKind, error: ProviderError) {
        self.failures.insert(FailurePoint::Kind(kind), error);
    }

    fn check(&self, point: FailurePoint) -> Result<(), ProviderError> {
        match self.failures.get(&point) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn listing(&self, kind: ResourceKind, partition: &Partition) -> &[SnapshotItem] {
        let items = match partition {
            Partition::Global => self.global.get(&kind),
            Partition::Region(region) => self
                .regions
                .get(region)
                .and_then(|snapshot| snapshot.resources.get(&kind)),
        };
        items.map(Vec::as_slice).unwrap_or_default()
    }

    fn all_listings(&self, kind: ResourceKind) -> impl Iterator<Item = &SnapshotItem> {
        self.global
            .get(&kind)
            .into_iter()
            .chain(self.regions.values().filter_map(move |r| r.resources.get(&kind)))
            .flatten()
    }
}

/// Kinds whose listing carries tags, so no per-resource lookup is needed.
fn reports_tags_inline(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::Ec2Instance)
}

#[async_trait]
impl CloudProvider for SnapshotProvider {
    async fn account_id(&self) -> Result<String, ProviderError> {
        self.check(FailurePoint::Account)?;
        Ok(self.account_id.clone())
    }

    async fn list_regions(&self) -> Result<Vec<String>, ProviderError> {
        self.check(FailurePoint::Regions)?;
        Ok(self.regions.keys().cloned().collect())
    }

    async fn tag_index_page(
        &self,
        region: &str,
        token: Option<&str>,
    ) -> Result<TagIndexPage, ProviderError> {
        self.check(FailurePoint::TagIndex(region.to_string()))?;

        let index: &[TaggedArn] = self
            .regions
            .get(region)
            .map(|r| r.tag_index.as_slice())
            .unwrap_or_default();

        let start: usize = match token {
            Some(token) => token.parse().map_err(|_| {
                ProviderError::InvalidResponse(format!("unknown pagination token '{token}'"))
            })?,
            None => 0,
        };
        let end: usize = (start + self.page_size).min(index.len());

        let entries = index
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|entry| (entry.arn.clone(), entry.tags.clone()))
            .collect();
        let next_token = (end < index.len()).then(|| end.to_string());

        Ok(TagIndexPage {
            entries,
            next_token,
        })
    }

    async fn list_kind(
        &self,
        kind: ResourceKind,
        partition: &Partition,
    ) -> Result<Vec<KindDescriptor>, ProviderError> {
        self.check(FailurePoint::Kind(kind))?;

        Ok(self
            .listing(kind, partition)
            .iter()
            .map(|item| KindDescriptor {
                id: item.id.clone(),
                labels: if reports_tags_inline(kind) {
                    Some(item.tags.clone().unwrap_or_default())
                } else {
                    None
                },
            })
            .collect())
    }

    async fn lookup_tags(
        &self,
        kind: ResourceKind,
        partial: &str,
        _id: &ResourceId,
    ) -> Result<TagLookup, ProviderError> {
        self.check(FailurePoint::Kind(kind))?;

        let item = self
            .all_listings(kind)
            .find(|item| item.id.as_deref() == Some(partial))
            .ok_or_else(|| ProviderError::Request(format!("{kind} '{partial}' does not exist")))?;

        Ok(match &item.tags {
            Some(tags) if !tags.is_empty() => TagLookup::Labels(tags.clone()),
            _ => TagLookup::NoLabels,
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "account_id": "123456789012",
        "page_size": 1,
        "regions": {
            "us-east-1": {
                "tag_index": [
                    { "arn": "arn:aws:sqs:us-east-1:123456789012:jobs", "tags": { "AppName": "jobs" } },
                    { "arn": "arn:aws:sns:us-east-1:123456789012:alerts" }
                ],
                "resources": { "ec2-instance": [{ "id": "i-0abc" }] }
            },
            "eu-west-1": {}
        },
        "global": { "s3-bucket": [{ "id": "logs" }, { "id": "assets", "tags": { "AppCode": "a1" } }] }
    }"#;

    #[tokio::test]
    async fn test_from_json() {
        let provider = SnapshotProvider::from_json(SNAPSHOT).unwrap();
        assert_eq!(provider.account_id().await.unwrap(), "123456789012");
        assert_eq!(
            provider.list_regions().await.unwrap(),
            vec!["eu-west-1", "us-east-1"]
        );
    }

    #[tokio::test]
    async fn test_tag_index_pagination() {
        let provider = SnapshotProvider::from_json(SNAPSHOT).unwrap();

        let first = provider.tag_index_page("us-east-1", None).await.unwrap();
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.next_token.as_deref(), Some("1"));

        let second = provider.tag_index_page("us-east-1", Some("1")).await.unwrap();
        assert_eq!(second.entries.len(), 1);
        assert!(second.entries[0].1.is_empty());
        assert_eq!(second.next_token, None);

        assert!(provider.tag_index_page("us-east-1", Some("bogus")).await.is_err());
    }

    #[tokio::test]
    async fn test_inline_tags_only_for_instances() {
        let provider = SnapshotProvider::from_json(SNAPSHOT).unwrap();

        let instances = provider
            .list_kind(ResourceKind::Ec2Instance, &Partition::region("us-east-1"))
            .await
            .unwrap();
        assert_eq!(instances[0].labels, Some(LabelSet::new()));

        let buckets = provider
            .list_kind(ResourceKind::S3Bucket, &Partition::Global)
            .await
            .unwrap();
        assert_eq!(buckets.len(), 2);
        assert!(buckets.iter().all(|b| b.labels.is_none()));
    }

    #[tokio::test]
    async fn test_lookup_tags() {
        let provider = SnapshotProvider::from_json(SNAPSHOT).unwrap();
        let id = ResourceId::new("arn:aws:s3:::logs");

        let logs = provider
            .lookup_tags(ResourceKind::S3Bucket, "logs", &id)
            .await
            .unwrap();
        assert_eq!(logs, TagLookup::NoLabels);

        let assets = provider
            .lookup_tags(ResourceKind::S3Bucket, "assets", &id)
            .await
            .unwrap();
        assert_eq!(assets.into_labels().get("AppCode"), Some("a1"));

        assert!(
            provider
                .lookup_tags(ResourceKind::S3Bucket, "missing", &id)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let mut provider = SnapshotProvider::new("123456789012");
        provider.fail_account(ProviderError::Authentication("expired".into()));
        provider.fail_tag_index("us-east-1", ProviderError::Network("down".into()));

        assert!(matches!(
            provider.account_id().await,
            Err(ProviderError::Authentication(_))
        ));
        assert!(provider.tag_index_page("us-east-1", None).await.is_err());
        assert!(provider.tag_index_page("us-west-2", None).await.is_ok());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(SnapshotProvider::from_json(r#"{ "account_id": "1", "page_size": 0 }"#).is_err());
        assert!(SnapshotProvider::from_json("{}").is_err());
    }
}
