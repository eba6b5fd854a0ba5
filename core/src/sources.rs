//! # Discovery Sources
//!
//! Concrete [`DiscoverySource`] implementations on top of a [`CloudProvider`].
//!
//! * [`generic::GenericTaggingSource`]: the provider-wide tag index, queried per region.
//! * [`fallback::FallbackSource`]: one per [`ResourceKind`] the tag index misreports.

use std::sync::Arc;

use tagscan_common::discovery::DiscoverySource;
use tagscan_common::provider::CloudProvider;
use tagscan_common::resource::ResourceKind;

pub mod fallback;
pub mod generic;

pub use fallback::FallbackSource;
pub use generic::GenericTaggingSource;

/// Builds the tag index source followed by one fallback per requested kind.
///
/// Kinds keep the order given; repeats are ignored.
pub fn standard_sources(
    provider: Arc<dyn CloudProvider>,
    fallbacks: &[ResourceKind],
) -> Vec<Box<dyn DiscoverySource>> {
    let mut sources: Vec<Box<dyn DiscoverySource>> =
        vec![Box::new(GenericTaggingSource::new(provider.clone()))];

    let mut added: Vec<ResourceKind> = Vec::new();
    for kind in fallbacks {
        if added.contains(kind) {
            continue;
        }
        added.push(*kind);
        sources.push(Box::new(FallbackSource::new(*kind, provider.clone())));
    }

    sources
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
    use crate::provider::SnapshotProvider;
    use tagscan_common::discovery::{ScanContext, SourcePriority, SourceScope};
    use tagscan_common::provider::ProviderError;
    use tagscan_common::resource::{LabelSet, Partition};

    const ACCOUNT: &str = "123456789012";

    fn labels(pairs: &[(&str, &str)]) -> LabelSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_standard_sources_order() {
        let provider: Arc<dyn CloudProvider> = Arc::new(SnapshotProvider::new(ACCOUNT));
        let sources = standard_sources(
            provider,
            &[ResourceKind::S3Bucket, ResourceKind::Ec2Instance, ResourceKind::S3Bucket],
        );
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["tag-index", "s3-bucket", "ec2-instance"]);
        assert_eq!(sources[0].priority(), SourcePriority::Generic);
        assert_eq!(sources[1].scope(), SourceScope::Global);
        assert_eq!(sources[2].scope(), SourceScope::Regional);
    }

    #[tokio::test]
    async fn test_generic_source_drains_all_pages() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT).with_page_size(2);
        for i in 0..5 {
            snapshot.tag(
                "us-east-1",
                &format!("arn:aws:sqs:us-east-1:{ACCOUNT}:queue-{i}"),
                labels(&[("AppName", "q")]),
            );
        }
        let source = GenericTaggingSource::new(Arc::new(snapshot));

        let found = source
            .fetch(&Partition::region("us-east-1"), &ScanContext::new(ACCOUNT))
            .await
            .unwrap();
        assert_eq!(found.len(), 5);
        assert_eq!(found[4].id.as_str(), "arn:aws:sqs:us-east-1:123456789012:queue-4");
    }

    #[tokio::test]
    async fn test_generic_source_ignores_global_partition() {
        let source = GenericTaggingSource::new(Arc::new(SnapshotProvider::new(ACCOUNT)));
        let found = source
            .fetch(&Partition::Global, &ScanContext::new(ACCOUNT))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_synthesizes_instance_arns() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.resource(
            Partition::region("us-east-1"),
            ResourceKind::Ec2Instance,
            Some("i-0abc"),
            Some(labels(&[("AppCode", "y")])),
        );
        let source = FallbackSource::new(ResourceKind::Ec2Instance, Arc::new(snapshot));

        let found = source
            .fetch(&Partition::region("us-east-1"), &ScanContext::new(ACCOUNT))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].id.as_str(),
            "arn:aws:ec2:us-east-1:123456789012:instance/i-0abc"
        );
        assert_eq!(found[0].labels.get("AppCode"), Some("y"));
    }

    #[tokio::test]
    async fn test_fallback_maps_missing_tag_set_to_empty() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.resource(Partition::Global, ResourceKind::S3Bucket, Some("logs"), None);
        snapshot.resource(
            Partition::Global,
            ResourceKind::S3Bucket,
            Some("assets"),
            Some(labels(&[("AppName", "web")])),
        );
        let source = FallbackSource::new(ResourceKind::S3Bucket, Arc::new(snapshot));

        let found = source
            .fetch(&Partition::Global, &ScanContext::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id.as_str(), "arn:aws:s3:::logs");
        assert!(found[0].labels.is_empty());
        assert_eq!(found[1].labels.get("AppName"), Some("web"));
    }

    #[tokio::test]
    async fn test_fallback_skips_malformed_records() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.resource(Partition::Global, ResourceKind::IamRole, None, None);
        snapshot.resource(Partition::Global, ResourceKind::IamRole, Some("deploy"), None);
        let source = FallbackSource::new(ResourceKind::IamRole, Arc::new(snapshot));

        let found = source
            .fetch(&Partition::Global, &ScanContext::new(ACCOUNT))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "arn:aws:iam::123456789012:role/deploy");
    }

    #[tokio::test]
    async fn test_fallback_keeps_role_path_in_arn() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.resource(
            Partition::Global,
            ResourceKind::IamRole,
            Some("service-role/lambda-exec"),
            Some(labels(&[("AppName", "fn")])),
        );
        let source = FallbackSource::new(ResourceKind::IamRole, Arc::new(snapshot));

        let found = source
            .fetch(&Partition::Global, &ScanContext::new(ACCOUNT))
            .await
            .unwrap();
        assert_eq!(
            found[0].id.as_str(),
            "arn:aws:iam::123456789012:role/service-role/lambda-exec"
        );
        assert_eq!(found[0].labels.get("AppName"), Some("fn"));
    }

    #[tokio::test]
    async fn test_fallback_without_account_skips_account_scoped_kinds() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.resource(
            Partition::region("us-east-1"),
            ResourceKind::Ec2Instance,
            Some("i-0abc"),
            None,
        );
        let source = FallbackSource::new(ResourceKind::Ec2Instance, Arc::new(snapshot));

        let found = source
            .fetch(&Partition::region("us-east-1"), &ScanContext::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_propagates_provider_errors() {
        let mut snapshot = SnapshotProvider::new(ACCOUNT);
        snapshot.fail_kind(
            ResourceKind::CloudfrontDistribution,
            ProviderError::Throttled("Rate exceeded".into()),
        );
        let source = FallbackSource::new(ResourceKind::CloudfrontDistribution, Arc::new(snapshot));

        let result = source.fetch(&Partition::Global, &ScanContext::new(ACCOUNT)).await;
        assert_eq!(result, Err(ProviderError::Throttled("Rate exceeded".into())));
    }
}
