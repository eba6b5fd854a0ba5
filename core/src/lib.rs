//! # Tagscan Core
//!
//! Services and adapters behind the `tagscan` binary.
//!
//! * **[`scanner`]**: the tag scan use case. Drives sources across partitions.
//! * **[`sources`]**: discovery sources (tag index, per-kind fallbacks).
//! * **[`reconciler`]**: first-writer-wins merge of source results.
//! * **[`classifier`]**: label gap classification.
//! * **[`report`]**: CSV export of findings.
//! * **[`provider`]**: concrete cloud providers.
//!     * *Outside the Hexagon*.

pub mod classifier;
pub mod provider;
pub mod reconciler;
pub mod report;
pub mod scanner;
pub mod sources;
