//! # Resource Identifiers
//!
//! Every reconciled resource is keyed by its fully-qualified ARN. Fallback
//! listings often only hand back a bare id (`i-0abc`, a bucket name, `/hostedzone/XYZ`),
//! so this module rebuilds the canonical ARN from kind, region and account.
//!
//! Two spellings of the same resource must produce the same [`ResourceId`],
//! otherwise the reconciler would count one resource twice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kind::ResourceKind;

/// ARN partition segment. Only the commercial partition is supported.
pub const AWS_PARTITION: &str = "aws";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("cannot build {kind} identifier: missing {field}")]
    MissingField {
        kind: ResourceKind,
        field: &'static str,
    },
    #[error("malformed ARN '{0}'")]
    Malformed(String),
}

/// Fully-qualified resource identifier. Deduplication key for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps an identifier that is already fully qualified (e.g. from the tag index).
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed view of the identifier, if it is a well-formed ARN.
    pub fn arn(&self) -> Result<Arn<'_>, IdentifierError> {
        Arn::parse(&self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Borrowed segments of `arn:partition:service:region:account:resource`.
///
/// The resource segment keeps any further `:` or `/` separators untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    pub fn parse(s: &'a str) -> Result<Self, IdentifierError> {
        let malformed = || IdentifierError::Malformed(s.to_string());

        let mut parts = s.splitn(6, ':');
        let prefix = parts.next().ok_or_else(malformed)?;
        if prefix != "arn" {
            return Err(malformed());
        }

        let partition = parts.next().ok_or_else(malformed)?;
        let service = parts.next().ok_or_else(malformed)?;
        let region = parts.next().ok_or_else(malformed)?;
        let account = parts.next().ok_or_else(malformed)?;
        let resource = parts.next().ok_or_else(malformed)?;

        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            partition,
            service,
            region,
            account,
            resource,
        })
    }

    /// Resource type prefix, e.g. `instance` for `instance/i-0abc`.
    pub fn resource_type(&self) -> Option<&'a str> {
        self.resource
            .split_once(['/', ':'])
            .map(|(resource_type, _)| resource_type)
    }
}

impl FromStr for ResourceId {
    type Err = IdentifierError;

    /// Accepts only well-formed ARNs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arn::parse(s)?;
        Ok(Self::new(s))
    }
}

/// Builds the canonical ARN for a partial identifier returned by a kind listing.
///
/// Per-kind addressing:
/// * EC2 instances embed region and account.
/// * S3 buckets embed only the bucket name.
/// * IAM roles, CloudFront distributions and Route 53 zones embed the account but no region.
///
/// IAM role ids include the role path (`service-role/name`) when it is not `/`.
///
/// Route 53 ids may arrive as a path (`/hostedzone/XYZ`); only the trailing id is kept.
/// The synthesized zone ARN carries the account while the tag index reports zones
/// without one, so the same zone seen by both sources is not deduplicated.
pub fn synthesize(
    kind: ResourceKind,
    region: Option<&str>,
    account: Option<&str>,
    partial: &str,
) -> Result<ResourceId, IdentifierError> {
    let missing = |field: &'static str| IdentifierError::MissingField { kind, field };
    let required = |value: Option<&str>, field: &'static str| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| missing(field))
    };

    let partial = partial.trim();
    if partial.is_empty() {
        return Err(missing("resource id"));
    }

    let arn = match kind {
        ResourceKind::Ec2Instance => {
            let region = required(region, "region")?;
            let account = required(account, "account")?;
            format!("arn:{AWS_PARTITION}:ec2:{region}:{account}:instance/{partial}")
        }
        ResourceKind::S3Bucket => format!("arn:{AWS_PARTITION}:s3:::{partial}"),
        ResourceKind::IamRole => {
            let account = required(account, "account")?;
            format!("arn:{AWS_PARTITION}:iam::{account}:role/{partial}")
        }
        ResourceKind::CloudfrontDistribution => {
            let account = required(account, "account")?;
            format!("arn:{AWS_PARTITION}:cloudfront::{account}:distribution/{partial}")
        }
        ResourceKind::Route53HostedZone => {
            let account = required(account, "account")?;
            let zone_id = hosted_zone_id(partial).ok_or_else(|| missing("hosted zone id"))?;
            format!("arn:{AWS_PARTITION}:route53::{account}:hostedzone/{zone_id}")
        }
    };

    Ok(ResourceId(arn))
}

/// Extracts `XYZ` from `/hostedzone/XYZ` (or returns a bare id unchanged).
fn hosted_zone_id(raw: &str) -> Option<&str> {
    raw.rsplit('/').next().filter(|id| !id.is_empty())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
