//! [`CloudProvider`] backed by the `aws` command line tool.
//!
//! Credentials, profiles and endpoints are whatever the CLI is already configured
//! with. Each call runs one CLI command with `--output json` and decodes the
//! response. Failures are classified from the `An error occurred (Code)` line the
//! CLI prints on stderr.

use std::io::ErrorKind;
use std::process::Output;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tagscan_common::provider::{
    CloudProvider, KindDescriptor, ProviderError, TagIndexPage, TagLookup,
};
use tagscan_common::resource::{LabelSet, Partition, ResourceId, ResourceKind};
use tokio::process::Command;
use tracing::trace;

const TAG_INDEX_PAGE_SIZE: u32 = 100;

const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthFailure",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidAccessKeyId",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnauthorizedOperation",
    "UnrecognizedClientException",
];

const THROTTLE_ERROR_CODES: &[&str] = &[
    "RequestLimitExceeded",
    "SlowDown",
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
];

/// Error codes meaning "the resource exists but has no tag set".
const NO_TAG_SET_CODES: &[&str] = &["NoSuchTagSet", "NoSuchTagSetError"];

pub struct AwsCliProvider {
    program: String,
    profile: Option<String>,
    home_region: String,
}

impl AwsCliProvider {
    /// `home_region` is used for calls that are not tied to a scanned region.
    pub fn new(home_region: impl Into<String>) -> Self {
        Self {
            program: String::from("aws"),
            profile: None,
            home_region: home_region.into(),
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn spawn(&self, args: &[&str]) -> Result<Output, ProviderError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).args(["--output", "json", "--no-cli-pager"]);
        if let Some(profile) = &self.profile {
            cmd.args(["--profile", profile.as_str()]);
        }

        trace!("Running {} {}", self.program, args.join(" "));

        cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ProviderError::Unavailable(format!("'{}' was not found in PATH", self.program))
            }
            _ => ProviderError::Unavailable(format!("failed to run '{}': {e}", self.program)),
        })
    }

    /// Runs a call where an error code from `absent` means there is nothing to return.
    async fn run_or_absent<T: DeserializeOwned>(
        &self,
        args: &[&str],
        absent: &[&str],
    ) -> Result<Option<T>, ProviderError> {
        let output = self.spawn(args).await?;

        if output.status.success() {
            return decode(args, &output.stdout).map(Some);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = error_code(&stderr);
        if code.is_some_and(|code| absent.contains(&code)) {
            return Ok(None);
        }
        Err(classify_error(code, &stderr))
    }

    async fn run<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, ProviderError> {
        self.run_or_absent(args, &[]).await?.ok_or_else(|| {
            ProviderError::InvalidResponse(format!("'{}' returned nothing", args.join(" ")))
        })
    }

    fn region_of<'a>(&'a self, partition: &'a Partition) -> &'a str {
        partition.region_name().unwrap_or(self.home_region.as_str())
    }
}

#[async_trait]
impl CloudProvider for AwsCliProvider {
    async fn account_id(&self) -> Result<String, ProviderError> {
        let identity: CallerIdentity = self
            .run(&["sts", "get-caller-identity", "--region", self.home_region.as_str()])
            .await?;
        Ok(identity.account)
    }

    async fn list_regions(&self) -> Result<Vec<String>, ProviderError> {
        let regions: DescribeRegions = self
            .run(&["ec2", "describe-regions", "--region", self.home_region.as_str()])
            .await?;
        Ok(regions.regions.into_iter().map(|r| r.region_name).collect())
    }

    async fn tag_index_page(
        &self,
        region: &str,
        token: Option<&str>,
    ) -> Result<TagIndexPage, ProviderError> {
        let page_size = TAG_INDEX_PAGE_SIZE.to_string();
        let mut args = vec![
            "resourcegroupstaggingapi",
            "get-resources",
            "--region",
            region,
            "--max-items",
            page_size.as_str(),
        ];
        if let Some(token) = token {
            args.extend(["--starting-token", token]);
        }

        let page: GetResources = self.run(&args).await?;
        Ok(page.into())
    }

    async fn list_kind(
        &self,
        kind: ResourceKind,
        partition: &Partition,
    ) -> Result<Vec<KindDescriptor>, ProviderError> {
        let region = self.region_of(partition);

        let descriptors = match kind {
            ResourceKind::Ec2Instance => self
                .run::<DescribeInstances>(&["ec2", "describe-instances", "--region", region])
                .await?
                .into_descriptors(),
            ResourceKind::S3Bucket => self
                .run::<ListBuckets>(&["s3api", "list-buckets", "--region", region])
                .await?
                .buckets
                .into_iter()
                .map(|b| KindDescriptor { id: b.name, labels: None })
                .collect(),
            ResourceKind::IamRole => self
                .run::<ListRoles>(&["iam", "list-roles", "--region", region])
                .await?
                .into_descriptors(),
            ResourceKind::CloudfrontDistribution => self
                .run::<ListDistributions>(&["cloudfront", "list-distributions", "--region", region])
                .await?
                .distribution_list
                .map(|list| list.items)
                .unwrap_or_default()
                .into_iter()
                .map(|d| KindDescriptor { id: d.id, labels: None })
                .collect(),
            ResourceKind::Route53HostedZone => self
                .run::<ListHostedZones>(&["route53", "list-hosted-zones", "--region", region])
                .await?
                .hosted_zones
                .into_iter()
                .map(|z| KindDescriptor { id: z.id, labels: None })
                .collect(),
        };

        Ok(descriptors)
    }

    async fn lookup_tags(
        &self,
        kind: ResourceKind,
        partial: &str,
        id: &ResourceId,
    ) -> Result<TagLookup, ProviderError> {
        let tags: Vec<Tag> = match kind {
            ResourceKind::Ec2Instance => {
                let region = id
                    .arn()
                    .ok()
                    .map(|arn| arn.region)
                    .filter(|region| !region.is_empty())
                    .unwrap_or(self.home_region.as_str());
                let filter = format!("Name=resource-id,Values={partial}");
                let args = ["ec2", "describe-tags", "--region", region, "--filters", filter.as_str()];
                self.run::<TagList>(&args).await?.tags
            }
            ResourceKind::S3Bucket => {
                let args = ["s3api", "get-bucket-tagging", "--bucket", partial];
                self.run_or_absent::<S3TagSet>(&args, NO_TAG_SET_CODES)
                    .await?
                    .map(|set| set.tag_set)
                    .unwrap_or_default()
            }
            ResourceKind::IamRole => {
                let args = ["iam", "list-role-tags", "--role-name", role_name(partial)];
                self.run::<TagList>(&args).await?.tags
            }
            ResourceKind::CloudfrontDistribution => {
                let args = ["cloudfront", "list-tags-for-resource", "--resource", id.as_str()];
                self.run::<CloudFrontTags>(&args).await?.tags.items
            }
            ResourceKind::Route53HostedZone => {
                let zone_id = partial.rsplit('/').next().unwrap_or(partial);
                let args = [
                    "route53",
                    "list-tags-for-resource",
                    "--resource-type",
                    "hostedzone",
                    "--resource-id",
                    zone_id,
                ];
                self.run::<Route53Tags>(&args).await?.resource_tag_set.tags
            }
        };

        if tags.is_empty() {
            Ok(TagLookup::NoLabels)
        } else {
            Ok(TagLookup::Labels(to_labels(tags)))
        }
    }
}

fn decode<T: DeserializeOwned>(args: &[&str], bytes: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ProviderError::InvalidResponse(format!("cannot decode '{}' output: {e}", args.join(" ")))
    })
}

/// Extracts `Code` from `An error occurred (Code) when calling ...`.
fn error_code(stderr: &str) -> Option<&str> {
    let (_, rest) = stderr.split_once("An error occurred (")?;
    let (code, _) = rest.split_once(')')?;
    (!code.is_empty()).then_some(code)
}

fn classify_error(code: Option<&str>, stderr: &str) -> ProviderError {
    let message: String = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no error output")
        .to_string();

    match code {
        Some(code) if AUTH_ERROR_CODES.contains(&code) => ProviderError::Authentication(message),
        Some(code) if THROTTLE_ERROR_CODES.contains(&code) => ProviderError::Throttled(message),
        Some(_) => ProviderError::Request(message),
        None if stderr.contains("Unable to locate credentials") => {
            ProviderError::Authentication(message)
        }
        None if stderr.contains("Could not connect to the endpoint URL")
            || stderr.contains("Connect timeout") =>
        {
            ProviderError::Network(message)
        }
        None => ProviderError::Request(message),
    }
}

fn to_labels(tags: Vec<Tag>) -> LabelSet {
    tags.into_iter().map(|tag| (tag.key, tag.value)).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentity {
    account: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeRegions {
    #[serde(default)]
    regions: Vec<RegionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RegionEntry {
    region_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetResources {
    #[serde(default)]
    resource_tag_mapping_list: Vec<TagMapping>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagMapping {
    #[serde(rename = "ResourceARN")]
    resource_arn: String,
    #[serde(rename = "Tags", default)]
    tags: Vec<Tag>,
}

impl From<GetResources> for TagIndexPage {
    fn from(page: GetResources) -> Self {
        Self {
            entries: page
                .resource_tag_mapping_list
                .into_iter()
                .map(|m| (ResourceId::new(m.resource_arn), to_labels(m.tags)))
                .collect(),
            next_token: page.next_token,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    instance_id: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl DescribeInstances {
    /// Instances report their tags inline; an absent `Tags` field means none.
    fn into_descriptors(self) -> Vec<KindDescriptor> {
        self.reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(|i| KindDescriptor {
                id: i.instance_id,
                labels: Some(to_labels(i.tags)),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBuckets {
    #[serde(default)]
    buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Bucket {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListRoles {
    #[serde(default)]
    roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Role {
    role_name: Option<String>,
    path: Option<String>,
}

impl ListRoles {
    /// Ids carry the role path (`service-role/lambda-exec`) so the synthesized ARN matches the real one.
    fn into_descriptors(self) -> Vec<KindDescriptor> {
        self.roles
            .into_iter()
            .map(|r| KindDescriptor {
                id: r.role_name.map(|name| {
                    let path = r.path.as_deref().unwrap_or("/").trim_matches('/');
                    if path.is_empty() {
                        name
                    } else {
                        format!("{path}/{name}")
                    }
                }),
                labels: None,
            })
            .collect()
    }
}

/// `list-role-tags` takes the bare name, without the path.
fn role_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListDistributions {
    distribution_list: Option<DistributionList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DistributionList {
    #[serde(default)]
    items: Vec<Distribution>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Distribution {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListHostedZones {
    #[serde(default)]
    hosted_zones: Vec<HostedZone>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZone {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TagList {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct S3TagSet {
    #[serde(default)]
    tag_set: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CloudFrontTags {
    tags: CloudFrontTagItems,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CloudFrontTagItems {
    #[serde(default)]
    items: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Route53Tags {
    resource_tag_set: Route53TagSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Route53TagSet {
    #[serde(default)]
    tags: Vec<Tag>,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
