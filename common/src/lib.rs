//! # tagscan-common
//!
//! Models and boundaries shared by the scanner core and the CLI.
//!
//! * **[`resource`]**: identifiers, labels, partitions and scan records.
//! * **[`provider`]**: the cloud provider capability (outbound port).
//! * **[`discovery`]**: the discovery source abstraction built on the provider.
//! * **[`config`]**: run configuration.

pub mod config;
pub mod discovery;
mod macros;
pub mod provider;
pub mod resource;
