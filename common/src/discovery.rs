//! The central **abstraction** for resource discovery.
//!
//! A [`DiscoverySource`] turns provider calls into `(identifier, labels)` pairs for
//! one partition. The scan service only depends on this trait; it orders sources by
//! [`SourcePriority`] and runs each in the partitions its [`SourceScope`] covers.

use async_trait::async_trait;

use crate::provider::ProviderError;
use crate::resource::{LabelSet, Partition, ResourceId};

/// Ordering of sources inside one partition. Lower runs first and wins on duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourcePriority {
    /// Provider-wide tag index.
    Generic,
    /// Kind-specific listing covering gaps in the tag index.
    Fallback,
}

/// Which partitions a source is queried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceScope {
    /// Once per region.
    Regional,
    /// Once per scan, under [`Partition::Global`].
    Global,
}

impl SourceScope {
    pub fn covers(&self, partition: &Partition) -> bool {
        match self {
            Self::Regional => !partition.is_global(),
            Self::Global => partition.is_global(),
        }
    }
}

/// Account context needed to synthesize fully-qualified identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanContext {
    pub account_id: Option<String>,
}

impl ScanContext {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
        }
    }

    pub fn account(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

/// A resource as seen by one source, already keyed by its fully-qualified identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub id: ResourceId,
    pub labels: LabelSet,
}

impl Discovered {
    pub fn new(id: ResourceId, labels: LabelSet) -> Self {
        Self { id, labels }
    }
}

#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Short name used in logs and failure summaries.
    fn name(&self) -> &str;

    fn priority(&self) -> SourcePriority;

    fn scope(&self) -> SourceScope;

    /// Fetches every resource this source can see in `partition`.
    ///
    /// Paginated sources must drain all pages before returning.
    async fn fetch(
        &self,
        partition: &Partition,
        context: &ScanContext,
    ) -> Result<Vec<Discovered>, ProviderError>;
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
    fn test_scope_covers() {
        let region = Partition::region("us-east-1");
        assert!(SourceScope::Regional.covers(&region));
        assert!(!SourceScope::Regional.covers(&Partition::Global));
        assert!(SourceScope::Global.covers(&Partition::Global));
        assert!(!SourceScope::Global.covers(&region));
    }

    #[test]
    fn test_generic_sorts_first() {
        let mut priorities = vec![SourcePriority::Fallback, SourcePriority::Generic];
        priorities.sort();
        assert_eq!(priorities, vec![SourcePriority::Generic, SourcePriority::Fallback]);
    }
}
