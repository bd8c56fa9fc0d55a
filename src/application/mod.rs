//! Application layer: resolution services
//!
//! This layer orchestrates domain primitives and depends on the tree source
//! boundary traits.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
