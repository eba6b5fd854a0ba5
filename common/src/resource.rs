//! # Resource Models
//!
//! Data carried through a tag scan, from discovery to the report.
//!
//! ## Identity
//! * [`arn::ResourceId`]: fully-qualified ARN, the deduplication key.
//! * [`arn::synthesize`]: rebuilds an ARN from the partial id a kind listing returns.
//!
//! ## Values
//! * [`labels::LabelSet`]: tags currently on a resource.
//! * [`labels::RequiredLabels`]: mandated tag keys.
//! * [`partition::Partition`]: region (or Global) a resource was discovered under.
//!
//! ## Results
//! * [`record::Resource`]: reconciled, not yet classified.
//! * [`record::InventoryRecord`]: classified, reportable.

pub mod arn;
pub mod kind;
pub mod labels;
pub mod partition;
pub mod record;

pub use arn::{Arn, IdentifierError, ResourceId};
pub use kind::ResourceKind;
pub use labels::{LabelSet, RequiredLabels};
pub use partition::Partition;
pub use record::{InventoryRecord, LabelGap, Resource};
