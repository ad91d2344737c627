//! Tool names, kinds, and the static metadata registry.
//!
//! Tools are a closed set expressed as an enum so the dispatcher's match
//! is exhaustive: adding a variant without wiring a handler is a compile
//! error rather than a runtime surprise. Names the product has announced
//! but not yet wired are listed separately and fail with `NotImplemented`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::ToolError;

/// Whether a tool reads or mutates planning data.
///
/// Confirmation is only ever required for mutations; queries are always
/// exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Read-only lookup, never requires confirmation.
    Query,
    /// Mutates shared planning data, requires confirmation by default.
    Mutation,
}

/// The closed set of wired tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    CreateClient,
    AddGuest,
    UpdateGuest,
    RemoveGuest,
    UpdateRsvp,
    AddTimelineItem,
    ShiftTimeline,
    RemoveTimelineItem,
    AddBudgetItem,
    UpdateBudgetItem,
    AddVendor,
    UpdateVendor,
    ListGuests,
    GetTimeline,
    GetBudgetSummary,
}

/// Names declared in the product surface but not yet wired to a handler.
const RESERVED_TOOL_NAMES: &[&str] = &["export_guest_list", "import_guests"];

impl ToolName {
    /// All wired tools, in registry order.
    pub const ALL: &'static [ToolName] = &[
        ToolName::CreateClient,
        ToolName::AddGuest,
        ToolName::UpdateGuest,
        ToolName::RemoveGuest,
        ToolName::UpdateRsvp,
        ToolName::AddTimelineItem,
        ToolName::ShiftTimeline,
        ToolName::RemoveTimelineItem,
        ToolName::AddBudgetItem,
        ToolName::UpdateBudgetItem,
        ToolName::AddVendor,
        ToolName::UpdateVendor,
        ToolName::ListGuests,
        ToolName::GetTimeline,
        ToolName::GetBudgetSummary,
    ];

    /// The wire name of the tool (snake_case, as the model emits it).
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::CreateClient => "create_client",
            ToolName::AddGuest => "add_guest",
            ToolName::UpdateGuest => "update_guest",
            ToolName::RemoveGuest => "remove_guest",
            ToolName::UpdateRsvp => "update_rsvp",
            ToolName::AddTimelineItem => "add_timeline_item",
            ToolName::ShiftTimeline => "shift_timeline",
            ToolName::RemoveTimelineItem => "remove_timeline_item",
            ToolName::AddBudgetItem => "add_budget_item",
            ToolName::UpdateBudgetItem => "update_budget_item",
            ToolName::AddVendor => "add_vendor",
            ToolName::UpdateVendor => "update_vendor",
            ToolName::ListGuests => "list_guests",
            ToolName::GetTimeline => "get_timeline",
            ToolName::GetBudgetSummary => "get_budget_summary",
        }
    }

    /// Parses a wire name.
    ///
    /// Exact match only, no pattern fallback. A name that is
    /// declared but unwired fails with `NotImplemented`; anything else
    /// fails with `UnknownTool`.
    pub fn parse(name: &str) -> Result<Self, ToolError> {
        for tool in Self::ALL {
            if tool.as_str() == name {
                return Ok(*tool);
            }
        }
        if RESERVED_TOOL_NAMES.contains(&name) {
            return Err(ToolError::NotImplemented(name.to_string()));
        }
        Err(ToolError::UnknownTool(name.to_string()))
    }

    /// Returns the tool's kind from the registry.
    pub fn kind(&self) -> ToolKind {
        registry().metadata(*self).kind
    }

    /// Returns true for read-only tools.
    pub fn is_query(&self) -> bool {
        self.kind() == ToolKind::Query
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static registry entry for one tool.
///
/// Loaded once at process start; lookup-only afterwards.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    /// The tool this entry describes.
    pub name: ToolName,
    /// Query or mutation.
    pub kind: ToolKind,
    /// Short imperative label shown on the confirmation affordance.
    pub action_label: &'static str,
    /// Preview description template with `{field}` placeholders, if the
    /// tool has one. Tools without a template get a generic description.
    pub description_template: Option<&'static str>,
    /// Mutations require confirmation by default; an explicitly exempted
    /// mutation executes immediately. Meaningless for queries.
    pub confirmation_exempt: bool,
    /// Human-readable descriptions of secondary writes this tool triggers.
    pub cascade_effect_descriptions: &'static [&'static str],
}

impl ToolMetadata {
    /// Whether calls to this tool must be confirmed before execution.
    ///
    /// Queries never require confirmation; mutations do unless
    /// explicitly exempted.
    pub fn requires_confirmation(&self) -> bool {
        self.kind == ToolKind::Mutation && !self.confirmation_exempt
    }
}

/// Immutable tool registry, built once at process start.
///
/// There are deliberately no setters: the table is static configuration,
/// not mutable state.
#[derive(Debug)]
pub struct ToolRegistry {
    entries: HashMap<ToolName, ToolMetadata>,
}

impl ToolRegistry {
    fn standard() -> Self {
        let mut entries = HashMap::new();
        for meta in standard_metadata() {
            entries.insert(meta.name, meta);
        }
        Self { entries }
    }

    /// Looks up the metadata for a tool. Every `ToolName` variant has an
    /// entry; the table and the enum are built together.
    pub fn metadata(&self, name: ToolName) -> &ToolMetadata {
        self.entries
            .get(&name)
            .expect("registry covers every ToolName variant")
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the registry is empty (never, in practice).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide registry instance.
pub fn registry() -> &'static ToolRegistry {
    static REGISTRY: Lazy<ToolRegistry> = Lazy::new(ToolRegistry::standard);
    &REGISTRY
}

fn standard_metadata() -> Vec<ToolMetadata> {
    use ToolKind::*;
    use ToolName::*;

    vec![
        ToolMetadata {
            name: CreateClient,
            kind: Mutation,
            action_label: "Create Client",
            description_template: Some("Create client {name}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[
                "A default event will be created for the client",
                "A starting budget allocation will be seeded",
            ],
        },
        ToolMetadata {
            name: AddGuest,
            kind: Mutation,
            action_label: "Add Guest",
            description_template: Some("Add guest {firstName} to the guest list"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: UpdateGuest,
            kind: Mutation,
            action_label: "Update Guest",
            description_template: Some("Update guest {guestName}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: RemoveGuest,
            kind: Mutation,
            action_label: "Remove Guest",
            description_template: Some("Remove guest {guestName} from the guest list"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &["Any seat assignment for the guest will be released"],
        },
        ToolMetadata {
            name: UpdateRsvp,
            kind: Mutation,
            action_label: "Update RSVP",
            description_template: Some("Set RSVP of {guestName} to {status}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: AddTimelineItem,
            kind: Mutation,
            action_label: "Add Timeline Item",
            description_template: Some("Add \"{title}\" to the timeline"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: ShiftTimeline,
            kind: Mutation,
            action_label: "Shift Timeline",
            description_template: Some("Shift the timeline by {shiftMinutes} minutes"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[
                "Start and end times of every timeline item will move",
            ],
        },
        ToolMetadata {
            name: RemoveTimelineItem,
            kind: Mutation,
            action_label: "Remove Timeline Item",
            description_template: Some("Remove \"{title}\" from the timeline"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: AddBudgetItem,
            kind: Mutation,
            action_label: "Add Budget Item",
            description_template: Some("Add budget item {name} at {amount}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: UpdateBudgetItem,
            kind: Mutation,
            action_label: "Update Budget Item",
            description_template: Some("Update budget item {name}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: AddVendor,
            kind: Mutation,
            action_label: "Add Vendor",
            description_template: Some("Add vendor {name}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: UpdateVendor,
            kind: Mutation,
            action_label: "Update Vendor",
            description_template: Some("Update vendor {name}"),
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: ListGuests,
            kind: Query,
            action_label: "List Guests",
            description_template: None,
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: GetTimeline,
            kind: Query,
            action_label: "Get Timeline",
            description_template: None,
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
        ToolMetadata {
            name: GetBudgetSummary,
            kind: Query,
            action_label: "Get Budget Summary",
            description_template: None,
            confirmation_exempt: false,
            cascade_effect_descriptions: &[],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolves_every_wired_tool() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()).unwrap(), *tool);
        }
    }

    #[test]
    fn parse_rejects_unknown_name() {
        assert!(matches!(
            ToolName::parse("summon_dragon"),
            Err(ToolError::UnknownTool(_))
        ));
    }

    #[test]
    fn parse_flags_reserved_names_as_not_implemented() {
        assert!(matches!(
            ToolName::parse("export_guest_list"),
            Err(ToolError::NotImplemented(_))
        ));
        assert!(matches!(
            ToolName::parse("import_guests"),
            Err(ToolError::NotImplemented(_))
        ));
    }

    #[test]
    fn registry_covers_every_variant() {
        let registry = registry();
        assert_eq!(registry.len(), ToolName::ALL.len());
        for tool in ToolName::ALL {
            let meta = registry.metadata(*tool);
            assert_eq!(meta.name, *tool);
        }
    }

    #[test]
    fn queries_are_marked_as_queries() {
        assert_eq!(ToolName::ListGuests.kind(), ToolKind::Query);
        assert_eq!(ToolName::GetTimeline.kind(), ToolKind::Query);
        assert_eq!(ToolName::GetBudgetSummary.kind(), ToolKind::Query);
        assert!(ToolName::ListGuests.is_query());
    }

    #[test]
    fn mutations_are_marked_as_mutations() {
        assert_eq!(ToolName::AddGuest.kind(), ToolKind::Mutation);
        assert_eq!(ToolName::ShiftTimeline.kind(), ToolKind::Mutation);
        assert!(!ToolName::CreateClient.is_query());
    }

    #[test]
    fn confirmation_required_for_every_mutation_and_no_query() {
        for tool in ToolName::ALL {
            let meta = registry().metadata(*tool);
            if tool.is_query() {
                assert!(!meta.requires_confirmation(), "{} should be exempt", tool);
            } else {
                assert!(meta.requires_confirmation(), "{} should require it", tool);
            }
        }
    }

    #[test]
    fn create_client_declares_cascades() {
        let meta = registry().metadata(ToolName::CreateClient);
        assert_eq!(meta.cascade_effect_descriptions.len(), 2);
    }

    #[test]
    fn wire_names_are_snake_case() {
        for tool in ToolName::ALL {
            let name = tool.as_str();
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
