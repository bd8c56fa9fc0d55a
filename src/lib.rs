//! treeselect: lazy tree-to-flat-option resolution
//!
//! Walks an externally owned tree whose lookups may answer immediately or
//! later, and produces a flat, filterable, navigable list of options.
//!
//! Layers:
//! - [`domain`]: deferred values, trampoline, entities, equivalence
//! - [`application`]: resolvers, filter, navigation, memo, facade
//! - [`infrastructure`]: boundary traits and tree sources
//! - [`cli`]: the `treeselect` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
