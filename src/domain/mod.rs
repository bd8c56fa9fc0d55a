//! Domain layer: entities and resolution primitives
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod deferred;
pub mod entities;
pub mod equivalence;
pub mod error;
pub mod trampoline;

pub use deferred::MaybeDeferred;
pub use entities::*;
pub use equivalence::{is_equivalent, EquivalenceFn};
pub use error::{DomainError, DomainResult};
pub use trampoline::{run, Step, Steps};
