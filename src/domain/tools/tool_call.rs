//! Tool call and execution result value objects.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::EntityId;

use super::ToolName;

/// A request to invoke a tool, as produced by the upstream model.
///
/// Immutable once issued. The name is the raw wire string; resolution
/// to a [`ToolName`] happens at the dispatch boundary so that unknown
/// names can be classified instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Wire name of the tool to invoke.
    name: String,

    /// Arguments for the tool (JSON object).
    arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Returns the wire name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw arguments.
    pub fn arguments(&self) -> &serde_json::Value {
        &self.arguments
    }
}

/// One secondary write performed alongside a primary mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// What happened (e.g. "created").
    pub action: String,
    /// Entity type affected (e.g. "event", "budget_allocation").
    pub entity_type: String,
    /// Id of the affected record.
    pub entity_id: EntityId,
}

impl CascadeResult {
    /// Creates a new cascade result.
    pub fn new(
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: EntityId,
    ) -> Self {
        Self {
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id,
        }
    }
}

/// Output of a dispatched tool call.
///
/// Transient value: returned to the caller and handed to the change
/// broadcaster, never persisted as a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    /// Whether the tool executed successfully.
    success: bool,

    /// The tool that ran.
    tool_name: ToolName,

    /// Data returned by the tool (if any).
    data: Option<serde_json::Value>,

    /// Human-readable outcome message.
    message: String,

    /// Secondary writes performed with the primary one.
    cascade_results: Vec<CascadeResult>,

    /// Error message (if failed).
    error: Option<String>,
}

impl ToolExecutionResult {
    /// Creates a successful result.
    pub fn success(
        tool_name: ToolName,
        data: serde_json::Value,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            tool_name,
            data: Some(data),
            message: message.into(),
            cascade_results: Vec::new(),
            error: None,
        }
    }

    /// Creates a failed result carrying an error message.
    pub fn failure(tool_name: ToolName, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            tool_name,
            data: None,
            message: error.clone(),
            cascade_results: Vec::new(),
            error: Some(error),
        }
    }

    /// Attaches cascade results.
    pub fn with_cascades(mut self, cascades: Vec<CascadeResult>) -> Self {
        self.cascade_results = cascades;
        self
    }

    /// Whether the tool succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The tool that ran.
    pub fn tool_name(&self) -> ToolName {
        self.tool_name
    }

    /// Returned data, if any.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Outcome message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Cascade results.
    pub fn cascade_results(&self) -> &[CascadeResult] {
        &self.cascade_results
    }

    /// Error message, if failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
