//! Merges per-source discovery batches into one deduplicated inventory.
//!
//! First writer wins: once an identifier is known, later sightings are discarded
//! entirely, labels and partition included. Nothing is merged across sources, so
//! the batch order decides which label set survives. The scan service feeds the
//! generic tag index before any fallback listing within a partition.

use std::collections::HashSet;

use tagscan_common::discovery::Discovered;
use tagscan_common::resource::{Partition, Resource, ResourceId};
use tracing::trace;

/// Everything one source reported for one partition.
#[derive(Debug, Clone)]
pub struct Batch {
    pub source: String,
    pub partition: Partition,
    pub items: Vec<Discovered>,
}

impl Batch {
    pub fn new(source: impl Into<String>, partition: Partition, items: Vec<Discovered>) -> Self {
        Self {
            source: source.into(),
            partition,
            items,
        }
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    seen: HashSet<ResourceId>,
    resources: Vec<Resource>,
    duplicates: usize,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every item not seen before. Returns how many were accepted.
    pub fn absorb(&mut self, batch: Batch) -> usize {
        let Batch {
            source,
            partition,
            items,
        } = batch;
        let mut accepted: usize = 0;

        for item in items {
            if self.seen.contains(&item.id) {
                trace!("{source} re-reported {}, keeping first sighting", item.id);
                self.duplicates += 1;
                continue;
            }
            self.seen.insert(item.id.clone());
            self.resources
                .push(Resource::new(item.id, item.labels, partition.clone()));
            accepted += 1;
        }

        accepted
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Sightings dropped because the identifier was already known.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Reconciled resources in first-seen order.
    pub fn finish(self) -> Vec<Resource> {
        self.resources
    }
}

/// Reconciles an ordered sequence of batches in one go.
pub fn reconcile<I>(batches: I) -> Vec<Resource>
where
    I: IntoIterator<Item = Batch>,
{
    let mut reconciler = Reconciler::new();
    for batch in batches {
        reconciler.absorb(batch);
    }
    reconciler.finish()
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

    fn item(arn: &str, labels: &[(&str, &str)]) -> Discovered {
        Discovered::new(ResourceId::new(arn), labels.iter().copied().collect())
    }

    fn batches() -> Vec<Batch> {
        let east = Partition::region("us-east-1");
        vec![
            Batch::new(
                "tag-index",
                east.clone(),
                vec![item("arn:r1", &[("AppName", "x")]), item("arn:r3", &[])],
            ),
            Batch::new(
                "ec2-instance",
                east,
                vec![item("arn:r1", &[]), item("arn:r2", &[("AppCode", "y")])],
            ),
            Batch::new("s3-bucket", Partition::Global, vec![item("arn:r3", &[("Owner", "z")])]),
        ]
    }

    #[test]
    fn test_first_writer_wins() {
        let resources = reconcile(batches());
        let ids: Vec<&str> = resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["arn:r1", "arn:r3", "arn:r2"]);

        let r1 = &resources[0];
        assert_eq!(r1.labels.get("AppName"), Some("x"));
        assert_eq!(r1.labels.len(), 1);
    }

    #[test]
    fn test_later_partition_is_discarded_with_labels() {
        let resources = reconcile(batches());
        let r3 = resources.iter().find(|r| r.id.as_str() == "arn:r3").unwrap();
        assert_eq!(r3.partition, Partition::region("us-east-1"));
        assert!(r3.labels.is_empty(), "labels must not be merged across sources");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        assert_eq!(reconcile(batches()), reconcile(batches()));
    }

    #[test]
    fn test_duplicate_count_and_accepts() {
        let mut reconciler = Reconciler::new();
        let mut accepted = Vec::new();
        for batch in batches() {
            accepted.push(reconciler.absorb(batch));
        }
        assert_eq!(accepted, vec![2, 1, 0]);
        assert_eq!(reconciler.duplicates(), 2);
        assert_eq!(reconciler.len(), 3);
    }

    #[test]
    fn test_duplicates_within_one_batch() {
        let batch = Batch::new(
            "tag-index",
            Partition::Global,
            vec![item("arn:a", &[("k", "1")]), item("arn:a", &[("k", "2")])],
        );
        let resources = reconcile([batch]);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].labels.get("k"), Some("1"));
    }

    #[test]
    fn test_empty_input() {
        let resources = reconcile(Vec::<Batch>::new());
        assert!(resources.is_empty());
        assert!(Reconciler::new().is_empty());
    }
}
