//! # Provider Adapters
//!
//! Concrete implementations of [`tagscan_common::provider::CloudProvider`].
//!
//! * [`aws_cli::AwsCliProvider`]: live account access through the `aws` CLI.
//! * [`snapshot::SnapshotProvider`]: in-memory inventory for offline audits and tests.

pub mod aws_cli;
pub mod snapshot;

pub use aws_cli::AwsCliProvider;
pub use snapshot::SnapshotProvider;
