//! Human-readable previews of proposed tool calls.
//!
//! A preview renders what a mutation will do before it is committed:
//! the affected fields, any cascade effects, and warnings from
//! tool-specific checks. Previews are built fresh per call and only
//! persisted as part of a pending call awaiting confirmation.

use serde::{Deserialize, Serialize};

use super::ToolName;

/// One argument rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewField {
    /// Argument key as the caller sent it.
    pub name: String,
    /// Raw value.
    pub value: serde_json::Value,
    /// Formatted value for display.
    pub display_value: String,
}

impl PreviewField {
    /// Creates a new preview field.
    pub fn new(
        name: impl Into<String>,
        value: serde_json::Value,
        display_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            display_value: display_value.into(),
        }
    }
}

/// A rendered preview of what a tool call will do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPreview {
    /// The tool being previewed.
    pub tool_name: ToolName,
    /// Short imperative label for the confirmation affordance.
    pub action_label: String,
    /// One-sentence description of the effect.
    pub description: String,
    /// Arguments rendered for display, in caller order.
    pub fields: Vec<PreviewField>,
    /// Secondary writes the call will trigger.
    pub cascade_effects: Vec<String>,
    /// Accumulated warnings from the independent checks.
    pub warnings: Vec<String>,
    /// Whether the call must be confirmed before execution.
    pub requires_confirmation: bool,
}

impl ToolPreview {
    /// Returns the field with the given name, if present.
    pub fn field(&self, name: &str) -> Option<&PreviewField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if any warning was raised.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_preview() -> ToolPreview {
        ToolPreview {
            tool_name: ToolName::AddGuest,
            action_label: "Add Guest".into(),
            description: "Add guest Ana to the guest list".into(),
            fields: vec![
                PreviewField::new("clientId", json!("c1"), "c1"),
                PreviewField::new("firstName", json!("Ana"), "Ana"),
            ],
            cascade_effects: vec![],
            warnings: vec![],
            requires_confirmation: true,
        }
    }

    #[test]
    fn field_lookup_finds_by_name() {
        let preview = sample_preview();
        let field = preview.field("firstName").unwrap();
        assert_eq!(field.value, json!("Ana"));
        assert_eq!(field.display_value, "Ana");
        assert!(preview.field("missing").is_none());
    }

    #[test]
    fn has_warnings_reflects_content() {
        let mut preview = sample_preview();
        assert!(!preview.has_warnings());
        preview.warnings.push("Projected spend exceeds budget".into());
        assert!(preview.has_warnings());
    }

    #[test]
    fn preview_serializes_to_json() {
        let preview = sample_preview();
        let json = serde_json::to_string(&preview).unwrap();
        assert!(json.contains("add_guest"));
        assert!(json.contains("requires_confirmation"));
    }
}
