//! Domain-level errors (no I/O concerns)

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed cause of a failed lookup, shareable between cache observers.
pub type SharedSource = Arc<dyn StdError + Send + Sync>;

/// Domain errors represent failed or inconsistent resolutions.
///
/// Cloneable so that a settled resolution can be observed by every
/// consumer of the same cached computation.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("lookup failed: {context}")]
    Lookup {
        context: String,
        #[source]
        source: SharedSource,
    },

    #[error("classification failed: {context}")]
    Classification {
        context: String,
        #[source]
        source: SharedSource,
    },

    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error("cycle detected in parent chain of {node} after {depth} ancestors")]
    CycleDetected { node: String, depth: usize },
}

impl DomainError {
    /// Lookup failure raised by a tree source.
    pub fn lookup<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Lookup {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// Lookup failure with a plain message as cause.
    pub fn lookup_msg(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            context: context.into(),
            source: Arc::new(Message(message.into())),
        }
    }

    /// Re-tag a failure that happened while classifying a node.
    ///
    /// Classification failures keep the original error as their source.
    pub fn into_classification(self, context: impl Into<String>) -> Self {
        match self {
            Self::Classification { .. } => self,
            other => Self::Classification {
                context: context.into(),
                source: Arc::new(other),
            },
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }

    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification { .. })
    }
}

/// Plain-text error cause.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct Message(pub String);

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
