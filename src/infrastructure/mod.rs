//! Infrastructure layer: tree sources, filter and DI container
//!
//! This layer implements the boundary traits and wires up services.

pub mod arena;
pub mod di;
pub mod error;
pub mod fs_tree;
pub mod traits;

pub use arena::ArenaTree;
pub use error::{InfraError, InfraResult};
pub use fs_tree::FsTreeSource;
