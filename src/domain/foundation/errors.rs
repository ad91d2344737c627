//! Error types for the tool execution pipeline.

use thiserror::Error;

use super::EntityId;

/// A candidate surfaced when free-text entity resolution matches more
/// than one record. Carried inside [`ToolError::Ambiguous`] so the caller
/// can re-prompt the user instead of the pipeline guessing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EntityCandidate {
    /// Id of the matching record
    pub id: EntityId,
    /// Human-readable label (e.g. "Ana Silva <ana@example.com>")
    pub label: String,
}

impl EntityCandidate {
    /// Creates a new candidate.
    pub fn new(id: EntityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Classified errors for tool dispatch and execution.
///
/// Every failure surfaced by the pipeline is one of these variants;
/// anything unclassified is wrapped as `Internal` at the dispatch
/// boundary.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Caller identity or tenant context is missing.
    #[error("Caller is not authenticated")]
    Unauthenticated,

    /// Arguments are missing or invalid for the tool.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The tool name has no registry entry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool is declared in the registry but has no wired handler.
    #[error("Tool not implemented: {0}")]
    NotImplemented(String),

    /// An entity, or an absent/expired pending call, was not found.
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// Entity resolution matched more than one record.
    #[error("Ambiguous reference '{query}': {} candidates", candidates.len())]
    Ambiguous {
        query: String,
        candidates: Vec<EntityCandidate>,
    },

    /// The transaction failed after exhausting retries, or on a
    /// non-retryable data-store error. Callers must not assume partial
    /// effects.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Anything unclassified.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a not found error for an entity kind.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates an ambiguous resolution error with the candidate list.
    pub fn ambiguous(query: impl Into<String>, candidates: Vec<EntityCandidate>) -> Self {
        Self::Ambiguous {
            query: query.into(),
            candidates,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::UnknownTool(_) => "UNKNOWN_TOOL",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Ambiguous { .. } => "AMBIGUOUS",
            Self::TransactionFailed(_) => "TRANSACTION_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
