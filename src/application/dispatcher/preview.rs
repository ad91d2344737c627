//! Preview generation for proposed tool calls.
//!
//! A preview is built fresh per call: fields from the non-null
//! arguments, a per-tool description, cascade effect descriptions from
//! the registry, and warnings from the independent tool-specific checks.

use std::sync::Arc;

use crate::domain::foundation::{CallerContext, ToolError};
use crate::domain::tools::{registry, PreviewField, ToolArgs, ToolName, ToolPreview};
use crate::ports::PlanningReader;

use super::format::{display_value, render_description};
use super::warnings::collect_warnings;

/// Builds human-readable previews of what a tool call will do.
pub struct PreviewGenerator {
    reader: Arc<dyn PlanningReader>,
}

impl PreviewGenerator {
    /// Creates a new preview generator.
    pub fn new(reader: Arc<dyn PlanningReader>) -> Self {
        Self { reader }
    }

    /// Generates a preview for a proposed call.
    ///
    /// Fails with `UnknownTool`/`NotImplemented` when the name has no
    /// wired registry entry. Warning checks that need data the tenant
    /// does not have (e.g. an unresolvable client) are skipped; the
    /// execution path reports those as errors.
    pub async fn generate(
        &self,
        tool_name: &str,
        arguments: &serde_json::Value,
        ctx: &CallerContext,
    ) -> Result<ToolPreview, ToolError> {
        let tool = ToolName::parse(tool_name)?;
        let meta = registry().metadata(tool);

        let fields = build_fields(arguments);

        let description = match meta.description_template {
            Some(template) => render_description(template, arguments),
            None => format!("Execute {}", tool),
        };

        let warnings = match ToolArgs::parse(tool, arguments) {
            Ok(args) => {
                let client = match client_reference(&args) {
                    Some(reference) => self
                        .reader
                        .resolve_client(ctx.tenant_id, reference)
                        .await
                        .unwrap_or_default(),
                    None => None,
                };
                collect_warnings(self.reader.as_ref(), ctx.tenant_id, client.as_ref(), &args)
                    .await
            }
            // Malformed arguments fail at execution with BadRequest; the
            // preview still renders what was proposed.
            Err(_) => Vec::new(),
        };

        Ok(ToolPreview {
            tool_name: tool,
            action_label: meta.action_label.to_string(),
            description,
            fields,
            cascade_effects: meta
                .cascade_effect_descriptions
                .iter()
                .map(|s| s.to_string())
                .collect(),
            warnings,
            requires_confirmation: meta.requires_confirmation(),
        })
    }
}

/// Builds preview fields from every non-null argument.
fn build_fields(arguments: &serde_json::Value) -> Vec<PreviewField> {
    let Some(object) = arguments.as_object() else {
        return Vec::new();
    };

    object
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| {
            PreviewField::new(name.clone(), value.clone(), display_value(name, value))
        })
        .collect()
}

/// The client reference embedded in a call's arguments, if the tool
/// operates on a client.
fn client_reference(args: &ToolArgs) -> Option<&str> {
    match args {
        ToolArgs::CreateClient(_) => None,
        ToolArgs::AddGuest(a) => Some(&a.client_id),
        ToolArgs::UpdateGuest(a) => Some(&a.client_id),
        ToolArgs::RemoveGuest(a) => Some(&a.client_id),
        ToolArgs::UpdateRsvp(a) => Some(&a.client_id),
        ToolArgs::AddTimelineItem(a) => Some(&a.client_id),
        ToolArgs::ShiftTimeline(a) => Some(&a.client_id),
        ToolArgs::RemoveTimelineItem(a) => Some(&a.client_id),
        ToolArgs::AddBudgetItem(a) => Some(&a.client_id),
        ToolArgs::UpdateBudgetItem(a) => Some(&a.client_id),
        ToolArgs::AddVendor(a) => Some(&a.client_id),
        ToolArgs::UpdateVendor(a) => Some(&a.client_id),
        ToolArgs::ListGuests(a) => Some(&a.client_id),
        ToolArgs::GetTimeline(a) => Some(&a.client_id),
        ToolArgs::GetBudgetSummary(a) => Some(&a.client_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPlanning;
    use crate::domain::foundation::{EntityId, TenantId, UserId};
    use crate::domain::planning::{BudgetItemRecord, GuestRecord};
    use crate::domain::tools::RsvpStatus;
    use serde_json::json;

    fn context() -> CallerContext {
        CallerContext::new(UserId::new("u-1"), TenantId::new())
    }

    fn generator_with(planning: Arc<InMemoryPlanning>) -> PreviewGenerator {
        PreviewGenerator::new(planning)
    }

    #[tokio::test]
    async fn add_guest_preview_requires_confirmation_with_fields() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate(
                "add_guest",
                &json!({"clientId": "c1", "firstName": "Ana"}),
                &context(),
            )
            .await
            .unwrap();

        assert!(preview.requires_confirmation);
        assert_eq!(preview.fields.len(), 2);
        let first_name = preview.field("firstName").unwrap();
        assert_eq!(first_name.value, json!("Ana"));
        assert_eq!(first_name.display_value, "Ana");
        assert_eq!(preview.description, "Add guest Ana to the guest list");
    }

    #[tokio::test]
    async fn query_preview_never_requires_confirmation() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate("list_guests", &json!({"clientId": "c1"}), &context())
            .await
            .unwrap();

        assert!(!preview.requires_confirmation);
        assert_eq!(preview.description, "Execute list_guests");
    }

    #[tokio::test]
    async fn unknown_tool_fails() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let err = generator
            .generate("summon_dragon", &json!({}), &context())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_TOOL");
    }

    #[tokio::test]
    async fn reserved_tool_fails_not_implemented() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let err = generator
            .generate("export_guest_list", &json!({}), &context())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn null_arguments_are_excluded_from_fields() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate(
                "add_guest",
                &json!({"clientId": "c1", "firstName": "Ana", "lastName": null}),
                &context(),
            )
            .await
            .unwrap();

        assert!(preview.field("lastName").is_none());
        assert_eq!(preview.fields.len(), 2);
    }

    #[tokio::test]
    async fn money_fields_render_with_currency_grouping() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate(
                "add_budget_item",
                &json!({"clientId": "c1", "name": "Flowers", "amount": 12500.5}),
                &context(),
            )
            .await
            .unwrap();

        assert_eq!(preview.field("amount").unwrap().display_value, "$12,500.50");
    }

    #[tokio::test]
    async fn create_client_preview_lists_cascade_effects() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate("create_client", &json!({"name": "Silva Wedding"}), &context())
            .await
            .unwrap();

        assert_eq!(preview.cascade_effects.len(), 2);
    }

    #[tokio::test]
    async fn budget_overrun_warning_is_raised() {
        let planning = Arc::new(InMemoryPlanning::new());
        let ctx = context();
        let client = planning.seed_client(ctx.tenant_id, "Silva Wedding", Some(5_000.0));
        planning.seed_budget_item(
            ctx.tenant_id,
            BudgetItemRecord {
                id: EntityId::new(),
                client_id: client.id,
                name: "Venue".into(),
                amount: 4_500.0,
                paid: false,
                category: None,
                vendor_name: None,
            },
        );

        let generator = generator_with(planning);
        let preview = generator
            .generate(
                "add_budget_item",
                &json!({"clientId": client.id.to_string(), "name": "Flowers", "amount": 1000.0}),
                &ctx,
            )
            .await
            .unwrap();

        assert!(preview.has_warnings());
        assert!(preview.warnings[0].contains("exceeds the total budget"));
    }

    #[tokio::test]
    async fn duplicate_guest_warning_is_raised() {
        let planning = Arc::new(InMemoryPlanning::new());
        let ctx = context();
        let client = planning.seed_client(ctx.tenant_id, "Silva Wedding", None);
        planning.seed_guest(
            ctx.tenant_id,
            GuestRecord {
                id: EntityId::new(),
                client_id: client.id,
                first_name: "Ana".into(),
                last_name: Some("Silva".into()),
                email: Some("ana@example.com".into()),
                phone: None,
                rsvp_status: RsvpStatus::Accepted,
                dietary_notes: None,
                seat_assignment: None,
            },
        );

        let generator = generator_with(planning);
        let preview = generator
            .generate(
                "add_guest",
                &json!({
                    "clientId": client.id.to_string(),
                    "firstName": "ana",
                    "lastName": "silva"
                }),
                &ctx,
            )
            .await
            .unwrap();

        assert!(preview.has_warnings());
        assert!(preview.warnings[0].contains("duplicate"));
    }

    #[tokio::test]
    async fn declined_rsvp_with_seat_warns_about_seating() {
        let planning = Arc::new(InMemoryPlanning::new());
        let ctx = context();
        let client = planning.seed_client(ctx.tenant_id, "Silva Wedding", None);
        planning.seed_guest(
            ctx.tenant_id,
            GuestRecord {
                id: EntityId::new(),
                client_id: client.id,
                first_name: "Ana".into(),
                last_name: Some("Silva".into()),
                email: None,
                phone: None,
                rsvp_status: RsvpStatus::Accepted,
                dietary_notes: None,
                seat_assignment: Some("Table 4".into()),
            },
        );

        let generator = generator_with(planning);
        let preview = generator
            .generate(
                "update_rsvp",
                &json!({
                    "clientId": client.id.to_string(),
                    "guestName": "Ana Silva",
                    "status": "declined"
                }),
                &ctx,
            )
            .await
            .unwrap();

        assert!(preview.has_warnings());
        assert!(preview.warnings[0].contains("seat"));
    }

    #[tokio::test]
    async fn past_date_warning_for_timeline_item() {
        let generator = generator_with(Arc::new(InMemoryPlanning::new()));
        let preview = generator
            .generate(
                "add_timeline_item",
                &json!({
                    "clientId": "c1",
                    "title": "Rehearsal",
                    "startsAt": "2001-01-01T10:00:00Z"
                }),
                &context(),
            )
            .await
            .unwrap();

        assert!(preview.warnings.iter().any(|w| w.contains("in the past")));
    }
}
