use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resource kinds the tag index is known to misreport or omit.
///
/// Each one gets a dedicated fallback listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Ec2Instance,
    S3Bucket,
    IamRole,
    CloudfrontDistribution,
    Route53HostedZone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        Self::Ec2Instance,
        Self::S3Bucket,
        Self::IamRole,
        Self::CloudfrontDistribution,
        Self::Route53HostedZone,
    ];

    /// Service segment used in this kind's ARN.
    pub fn service(&self) -> &'static str {
        match self {
            Self::Ec2Instance => "ec2",
            Self::S3Bucket => "s3",
            Self::IamRole => "iam",
            Self::CloudfrontDistribution => "cloudfront",
            Self::Route53HostedZone => "route53",
        }
    }

    /// Whether this kind is listed once per region rather than once per account.
    pub fn is_regional(&self) -> bool {
        matches!(self, Self::Ec2Instance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec2Instance => "ec2-instance",
            Self::S3Bucket => "s3-bucket",
            Self::IamRole => "iam-role",
            Self::CloudfrontDistribution => "cloudfront-distribution",
            Self::Route53HostedZone => "route53-hostedzone",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    /// Accepts the kebab-case name or the bare service name (`"ec2"`, `"s3"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower || kind.service() == lower)
            .ok_or_else(|| format!("unknown resource kind: {s}"))
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

    #[test]
    fn test_from_str_accepts_both_spellings() {
        assert_eq!(ResourceKind::from_str("ec2-instance"), Ok(ResourceKind::Ec2Instance));
        assert_eq!(ResourceKind::from_str("EC2"), Ok(ResourceKind::Ec2Instance));
        assert_eq!(ResourceKind::from_str("route53"), Ok(ResourceKind::Route53HostedZone));
        assert!(ResourceKind::from_str("lambda").is_err());
    }

    #[test]
    fn test_only_instances_are_regional() {
        let regional: Vec<ResourceKind> = ResourceKind::ALL
            .into_iter()
            .filter(ResourceKind::is_regional)
            .collect();
        assert_eq!(regional, vec![ResourceKind::Ec2Instance]);
    }
}
