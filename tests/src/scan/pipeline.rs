use std::sync::Arc;

use tagscan_common::config::{Config, RegionSelection, ReportPolicy};
use tagscan_common::provider::ProviderError;
use tagscan_common::resource::{LabelGap, LabelSet, Partition, RequiredLabels, ResourceKind};
use tagscan_core::provider::SnapshotProvider;
use tagscan_core::scanner::ScanService;

const ACCOUNT: &str = "123456789012";

const SNAPSHOT: &str = r#"{
    "account_id": "123456789012",
    "page_size": 2,
    "regions": {
        "us-east-1": {
            "tag_index": [
                { "arn": "arn:aws:ec2:us-east-1:123456789012:instance/i-0001", "tags": { "AppName": "web" } },
                { "arn": "arn:aws:sqs:us-east-1:123456789012:jobs", "tags": { "AppName": "jobs", "AppCode": "j1" } },
                { "arn": "arn:aws:sns:us-east-1:123456789012:alerts" }
            ],
            "resources": {
                "ec2-instance": [
                    { "id": "i-0001" },
                    { "id": "i-0002", "tags": { "AppCode": "api" } }
                ]
            }
        },
        "eu-west-1": {
            "tag_index": [
                { "arn": "arn:aws:lambda:eu-west-1:123456789012:function:resize", "tags": { "Owner": "media" } }
            ]
        }
    },
    "global": {
        "s3-bucket": [{ "id": "logs" }, { "id": "assets", "tags": { "AppName": "cdn", "AppCode": "c1" } }],
        "iam-role": [{ "id": "deploy" }],
        "route53-hostedzone": [{ "id": "/hostedzone/Z123", "tags": { "AppName": "dns" } }]
    }
}"#;

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().copied().collect()
}

fn config(regions: &[&str]) -> Config {
    Config {
        regions: RegionSelection::List(regions.iter().map(|r| r.to_string()).collect()),
        ..Config::default()
    }
}

/// Tag index reports R1 with AppName; the instance listing reports R1 untagged and R2 with AppCode.
#[tokio::test]
async fn tag_index_entry_wins_over_instance_listing() {
    let provider = Arc::new(SnapshotProvider::from_json(SNAPSHOT).unwrap());
    let cfg = config(&["us-east-1"]);

    let outcome = ScanService::from_config(provider, &cfg).run(&cfg).await.unwrap();

    let r1 = outcome
        .findings
        .iter()
        .find(|f| f.id().as_str() == "arn:aws:ec2:us-east-1:123456789012:instance/i-0001")
        .unwrap();
    assert_eq!(r1.gap(), &LabelGap::Missing(vec!["AppCode".into()]));

    let r2 = outcome
        .findings
        .iter()
        .find(|f| f.id().as_str() == "arn:aws:ec2:us-east-1:123456789012:instance/i-0002")
        .unwrap();
    assert_eq!(r2.gap(), &LabelGap::Missing(vec!["AppName".into()]));
    assert_eq!(r2.partition(), &Partition::region("us-east-1"));
}

#[tokio::test]
async fn full_account_scan_in_partition_order() {
    let provider = Arc::new(SnapshotProvider::from_json(SNAPSHOT).unwrap());
    let mut cfg = config(&[]);
    cfg.regions = RegionSelection::All;
    cfg.fallbacks = ResourceKind::ALL.to_vec();

    let outcome = ScanService::from_config(provider, &cfg).run(&cfg).await.unwrap();

    assert_eq!(
        outcome.partitions,
        vec![
            Partition::region("eu-west-1"),
            Partition::region("us-east-1"),
            Partition::Global
        ]
    );
    assert_eq!(outcome.account_id, ACCOUNT);
    assert_eq!(outcome.inventory_size, 9);
    assert_eq!(outcome.duplicates, 1);
    assert!(!outcome.is_degraded());

    let reported: Vec<(&str, String)> = outcome
        .findings
        .iter()
        .map(|f| (f.id().as_str(), f.gap().to_string()))
        .collect();
    assert_eq!(
        reported,
        vec![
            (
                "arn:aws:lambda:eu-west-1:123456789012:function:resize",
                "AppName, AppCode".to_string()
            ),
            (
                "arn:aws:ec2:us-east-1:123456789012:instance/i-0001",
                "AppCode".to_string()
            ),
            ("arn:aws:sns:us-east-1:123456789012:alerts", "AppName, AppCode".to_string()),
            (
                "arn:aws:ec2:us-east-1:123456789012:instance/i-0002",
                "AppName".to_string()
            ),
            ("arn:aws:s3:::logs", "AppName, AppCode".to_string()),
            ("arn:aws:iam::123456789012:role/deploy", "AppName, AppCode".to_string()),
            (
                "arn:aws:route53::123456789012:hostedzone/Z123",
                "AppCode".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn untagged_only_policy_reports_bare_resources() {
    let provider = Arc::new(SnapshotProvider::from_json(SNAPSHOT).unwrap());
    let cfg = Config {
        policy: ReportPolicy::UntaggedOnly,
        ..config(&["us-east-1", "eu-west-1"])
    };

    let outcome = ScanService::from_config(provider, &cfg).run(&cfg).await.unwrap();

    let ids: Vec<&str> = outcome.findings.iter().map(|f| f.id().as_str()).collect();
    assert_eq!(ids, vec!["arn:aws:sns:us-east-1:123456789012:alerts", "arn:aws:s3:::logs"]);
    assert!(outcome.findings.iter().all(|f| f.gap() == &LabelGap::NoTags));
}

#[tokio::test]
async fn empty_required_set_reports_only_untagged() {
    let mut snapshot = SnapshotProvider::new(ACCOUNT);
    snapshot.tag("us-east-1", "arn:aws:sqs:us-east-1:123456789012:a", LabelSet::new());
    snapshot.tag(
        "us-east-1",
        "arn:aws:sqs:us-east-1:123456789012:b",
        labels(&[("Foo", "bar")]),
    );

    let cfg = Config {
        required_tags: RequiredLabels::new(Vec::<String>::new()),
        ..config(&["us-east-1"])
    };
    let outcome = ScanService::from_config(Arc::new(snapshot), &cfg)
        .run(&cfg)
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(
        outcome.findings[0].id().as_str(),
        "arn:aws:sqs:us-east-1:123456789012:a"
    );
    assert_eq!(outcome.findings[0].gap().to_string(), "No Tags");
}

#[tokio::test]
async fn failing_fallback_degrades_without_losing_other_results() {
    let mut snapshot = SnapshotProvider::from_json(SNAPSHOT).unwrap();
    snapshot.fail_kind(
        ResourceKind::S3Bucket,
        ProviderError::Authentication("AccessDenied".into()),
    );

    let cfg = config(&["us-east-1"]);
    let outcome = ScanService::from_config(Arc::new(snapshot), &cfg)
        .run(&cfg)
        .await
        .unwrap();

    assert!(outcome.is_degraded());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].source, "s3-bucket");
    assert_eq!(outcome.failures[0].partition, Partition::Global);
    assert!(outcome.findings.iter().all(|f| f.service() != "s3"));
    assert_eq!(outcome.findings.len(), 3);
}

#[tokio::test]
async fn region_enumeration_failure_is_fatal() {
    let mut snapshot = SnapshotProvider::from_json(SNAPSHOT).unwrap();
    snapshot.fail_regions(ProviderError::Network("connect timeout".into()));

    let mut cfg = config(&[]);
    cfg.regions = RegionSelection::All;

    let result = ScanService::from_config(Arc::new(snapshot), &cfg).run(&cfg).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn invalid_region_is_rejected_before_any_call() {
    let cfg = config(&["US_EAST_1"]);
    let service = ScanService::from_config(Arc::new(SnapshotProvider::new(ACCOUNT)), &cfg);
    assert!(service.run(&cfg).await.is_err());

    let empty = config(&[]);
    assert!(service.run(&empty).await.is_err());
}
