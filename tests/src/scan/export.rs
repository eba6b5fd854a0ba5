use std::sync::Arc;

use tagscan_common::config::{Config, RegionSelection};
use tagscan_common::resource::{InventoryRecord, LabelSet, Partition, ResourceKind};
use tagscan_core::provider::SnapshotProvider;
use tagscan_core::report::{self, CsvReport, ReportSink};
use tagscan_core::scanner::ScanService;

const ACCOUNT: &str = "123456789012";

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().copied().collect()
}

async fn scan(snapshot: SnapshotProvider) -> Vec<InventoryRecord> {
    let cfg = Config {
        regions: RegionSelection::List(vec!["us-east-1".into()]),
        ..Config::default()
    };
    ScanService::from_config(Arc::new(snapshot), &cfg)
        .run(&cfg)
        .await
        .unwrap()
        .findings
}

#[tokio::test]
async fn findings_land_in_csv_with_region_and_service() {
    let mut snapshot = SnapshotProvider::new(ACCOUNT);
    snapshot.tag(
        "us-east-1",
        "arn:aws:dynamodb:us-east-1:123456789012:table/orders",
        labels(&[("AppCode", "o1")]),
    );
    snapshot.resource(
        Partition::Global,
        ResourceKind::S3Bucket,
        Some("logs"),
        None,
    );

    let findings = scan(snapshot).await;
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvReport::new(dir.path().join("missing_tags_report.csv"));
    let written = sink.write(&report::rows(&findings)).unwrap().unwrap();

    let mut reader = csv::Reader::from_path(&written).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Resource ARN", "Missing Tags", "Region", "Service"]);

    let records: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(
        records,
        vec![
            vec![
                "arn:aws:dynamodb:us-east-1:123456789012:table/orders".to_string(),
                "AppName".to_string(),
                "us-east-1".to_string(),
                "dynamodb".to_string(),
            ],
            vec![
                "arn:aws:s3:::logs".to_string(),
                "AppName, AppCode".to_string(),
                "Global".to_string(),
                "s3".to_string(),
            ],
        ]
    );
}

#[tokio::test]
async fn compliant_account_writes_no_file() {
    let mut snapshot = SnapshotProvider::new(ACCOUNT);
    snapshot.tag(
        "us-east-1",
        "arn:aws:sqs:us-east-1:123456789012:jobs",
        labels(&[("AppName", "jobs"), ("AppCode", "j1")]),
    );

    let findings = scan(snapshot).await;
    assert!(findings.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let sink = CsvReport::new(dir.path().join("missing_tags_report.csv"));
    assert_eq!(sink.write(&report::rows(&findings)).unwrap(), None);
    assert!(!sink.path().exists());
}

#[test]
fn timestamped_report_name_keeps_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = report::timestamped_path(&dir.path().join("missing_tags_report.csv"), "20250101_080000");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("missing_tags_report_20250101_080000.csv")
    );
    assert_eq!(path.parent(), Some(dir.path()));
}
