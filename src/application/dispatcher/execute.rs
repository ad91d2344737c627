//! The tool dispatcher: typed dispatch to exactly one handler per tool.
//!
//! Dispatch is an exhaustive match over [`ToolName`], so a variant
//! without a handler is a compile error. Handlers resolve free-text
//! entity references against the tenant's data, perform their writes
//! through the transactional store port, and never observe partial
//! cascades.

use std::sync::Arc;

use serde_json::json;

use crate::domain::foundation::{
    CallerContext, EntityCandidate, RequestIdentity, ToolError,
};
use crate::domain::planning::{ClientRef, GuestRecord};
use crate::domain::tools::{
    CascadeResult, ToolArgs, ToolCall, ToolExecutionResult, ToolName,
};
use crate::ports::{
    BudgetItemPatch, GuestPatch, NewBudgetItem, NewClient, NewGuest, NewTimelineItem, NewVendor,
    PlanningReader, PlanningStore, VendorPatch,
};

/// Dispatches tool calls to their handlers.
pub struct ToolDispatcher {
    store: Arc<dyn PlanningStore>,
    reader: Arc<dyn PlanningReader>,
}

impl ToolDispatcher {
    /// Creates a new dispatcher.
    pub fn new(store: Arc<dyn PlanningStore>, reader: Arc<dyn PlanningReader>) -> Self {
        Self { store, reader }
    }

    /// Executes a tool call.
    ///
    /// Fails with `Unauthenticated` when the caller context is missing,
    /// `UnknownTool`/`NotImplemented` for unregistered or unwired names,
    /// and `BadRequest` for malformed arguments. Anything a handler
    /// raises that is not already classified is wrapped as `Internal`.
    pub async fn execute(
        &self,
        call: &ToolCall,
        identity: &RequestIdentity,
    ) -> Result<ToolExecutionResult, ToolError> {
        let ctx = identity.require()?;
        let tool = ToolName::parse(call.name())?;
        let args = ToolArgs::parse(tool, call.arguments())?;
        self.dispatch(args, &ctx).await
    }

    async fn dispatch(
        &self,
        args: ToolArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        match args {
            ToolArgs::CreateClient(a) => self.create_client(a, ctx).await,
            ToolArgs::AddGuest(a) => self.add_guest(a, ctx).await,
            ToolArgs::UpdateGuest(a) => self.update_guest(a, ctx).await,
            ToolArgs::RemoveGuest(a) => self.remove_guest(a, ctx).await,
            ToolArgs::UpdateRsvp(a) => self.update_rsvp(a, ctx).await,
            ToolArgs::AddTimelineItem(a) => self.add_timeline_item(a, ctx).await,
            ToolArgs::ShiftTimeline(a) => self.shift_timeline(a, ctx).await,
            ToolArgs::RemoveTimelineItem(a) => self.remove_timeline_item(a, ctx).await,
            ToolArgs::AddBudgetItem(a) => self.add_budget_item(a, ctx).await,
            ToolArgs::UpdateBudgetItem(a) => self.update_budget_item(a, ctx).await,
            ToolArgs::AddVendor(a) => self.add_vendor(a, ctx).await,
            ToolArgs::UpdateVendor(a) => self.update_vendor(a, ctx).await,
            ToolArgs::ListGuests(a) => self.list_guests(a, ctx).await,
            ToolArgs::GetTimeline(a) => self.get_timeline(a, ctx).await,
            ToolArgs::GetBudgetSummary(a) => self.get_budget_summary(a, ctx).await,
        }
    }

    // === Entity resolution ===

    async fn resolve_client(
        &self,
        ctx: &CallerContext,
        reference: &str,
    ) -> Result<ClientRef, ToolError> {
        self.reader
            .resolve_client(ctx.tenant_id, reference)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?
            .ok_or_else(|| ToolError::not_found("Client", reference))
    }

    async fn resolve_guest(
        &self,
        ctx: &CallerContext,
        client: &ClientRef,
        name: &str,
    ) -> Result<GuestRecord, ToolError> {
        let mut matches = self
            .reader
            .guests_matching(ctx.tenant_id, client.id, name)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        match matches.len() {
            0 => Err(ToolError::not_found("Guest", name)),
            1 => Ok(matches.remove(0)),
            _ => Err(ToolError::ambiguous(
                name,
                matches
                    .iter()
                    .map(|g| EntityCandidate::new(g.id, g.label()))
                    .collect(),
            )),
        }
    }

    // === Mutation handlers ===

    async fn create_client(
        &self,
        a: crate::domain::tools::CreateClientArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let cascade = self
            .store
            .create_client_with_defaults(
                ctx.tenant_id,
                NewClient {
                    name: a.name.clone(),
                    email: a.email,
                    phone: a.phone,
                    event_date: a.event_date,
                    total_budget: a.total_budget,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::CreateClient,
            json!({
                "entityId": cascade.client.id,
                "clientId": cascade.client.id,
                "name": cascade.client.name,
            }),
            format!("Created client {}", a.name),
        )
        .with_cascades(vec![
            CascadeResult::new("created", "event", cascade.event_id),
            CascadeResult::new("created", "budget_allocation", cascade.budget_allocation_id),
        ]))
    }

    async fn add_guest(
        &self,
        a: crate::domain::tools::AddGuestArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let guest = self
            .store
            .insert_guest(
                ctx.tenant_id,
                NewGuest {
                    client_id: client.id,
                    first_name: a.first_name,
                    last_name: a.last_name,
                    email: a.email,
                    phone: a.phone,
                    side: a.side,
                    dietary_notes: a.dietary_notes,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::AddGuest,
            json!({
                "entityId": guest.id,
                "clientId": client.id,
                "guest": guest,
            }),
            format!("Added {} to the guest list", guest.full_name()),
        ))
    }

    async fn update_guest(
        &self,
        a: crate::domain::tools::UpdateGuestArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let guest = self.resolve_guest(ctx, &client, &a.guest_name).await?;
        let updated = self
            .store
            .update_guest(
                ctx.tenant_id,
                guest.id,
                GuestPatch {
                    first_name: a.first_name,
                    last_name: a.last_name,
                    email: a.email,
                    phone: a.phone,
                    dietary_notes: a.dietary_notes,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::UpdateGuest,
            json!({
                "entityId": updated.id,
                "clientId": client.id,
                "guest": updated,
            }),
            format!("Updated guest {}", updated.full_name()),
        ))
    }

    async fn remove_guest(
        &self,
        a: crate::domain::tools::RemoveGuestArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let guest = self.resolve_guest(ctx, &client, &a.guest_name).await?;
        self.store.remove_guest(ctx.tenant_id, guest.id).await?;

        Ok(ToolExecutionResult::success(
            ToolName::RemoveGuest,
            json!({
                "entityId": guest.id,
                "clientId": client.id,
            }),
            format!("Removed {} from the guest list", guest.full_name()),
        ))
    }

    async fn update_rsvp(
        &self,
        a: crate::domain::tools::UpdateRsvpArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let guest = self.resolve_guest(ctx, &client, &a.guest_name).await?;
        let updated = self.store.set_rsvp(ctx.tenant_id, guest.id, a.status).await?;

        Ok(ToolExecutionResult::success(
            ToolName::UpdateRsvp,
            json!({
                "entityId": updated.id,
                "clientId": client.id,
                "status": a.status,
            }),
            format!("Set RSVP of {} to {}", updated.full_name(), a.status),
        ))
    }

    async fn add_timeline_item(
        &self,
        a: crate::domain::tools::AddTimelineItemArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let item = self
            .store
            .insert_timeline_item(
                ctx.tenant_id,
                NewTimelineItem {
                    client_id: client.id,
                    title: a.title,
                    starts_at: a.starts_at,
                    ends_at: a.ends_at,
                    location: a.location,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::AddTimelineItem,
            json!({
                "entityId": item.id,
                "clientId": client.id,
                "item": item,
            }),
            format!("Added \"{}\" to the timeline", item.title),
        ))
    }

    async fn shift_timeline(
        &self,
        a: crate::domain::tools::ShiftTimelineArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let shifted = self
            .store
            .shift_timeline(ctx.tenant_id, client.id, a.shift_minutes)
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::ShiftTimeline,
            json!({
                "entityId": client.id,
                "clientId": client.id,
                "shiftedCount": shifted,
                "shiftMinutes": a.shift_minutes,
            }),
            format!("Shifted {} timeline items by {} minutes", shifted, a.shift_minutes),
        ))
    }

    async fn remove_timeline_item(
        &self,
        a: crate::domain::tools::RemoveTimelineItemArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let mut matches = self
            .reader
            .timeline_items_titled(ctx.tenant_id, client.id, &a.title)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let item = match matches.len() {
            0 => return Err(ToolError::not_found("Timeline item", &a.title)),
            1 => matches.remove(0),
            _ => {
                return Err(ToolError::ambiguous(
                    &a.title,
                    matches
                        .iter()
                        .map(|i| EntityCandidate::new(i.id, format!("{} at {}", i.title, i.starts_at)))
                        .collect(),
                ))
            }
        };
        self.store.remove_timeline_item(ctx.tenant_id, item.id).await?;

        Ok(ToolExecutionResult::success(
            ToolName::RemoveTimelineItem,
            json!({
                "entityId": item.id,
                "clientId": client.id,
            }),
            format!("Removed \"{}\" from the timeline", item.title),
        ))
    }

    async fn add_budget_item(
        &self,
        a: crate::domain::tools::AddBudgetItemArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let item = self
            .store
            .insert_budget_item(
                ctx.tenant_id,
                NewBudgetItem {
                    client_id: client.id,
                    name: a.name,
                    amount: a.amount,
                    category: a.category,
                    vendor_name: a.vendor_name,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::AddBudgetItem,
            json!({
                "entityId": item.id,
                "clientId": client.id,
                "item": item,
            }),
            format!("Added budget item {}", item.name),
        ))
    }

    async fn update_budget_item(
        &self,
        a: crate::domain::tools::UpdateBudgetItemArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let mut matches = self
            .reader
            .budget_items_named(ctx.tenant_id, client.id, &a.name)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let item = match matches.len() {
            0 => return Err(ToolError::not_found("Budget item", &a.name)),
            1 => matches.remove(0),
            _ => {
                return Err(ToolError::ambiguous(
                    &a.name,
                    matches
                        .iter()
                        .map(|i| EntityCandidate::new(i.id, i.name.clone()))
                        .collect(),
                ))
            }
        };
        let updated = self
            .store
            .update_budget_item(
                ctx.tenant_id,
                item.id,
                BudgetItemPatch {
                    amount: a.amount,
                    paid: a.paid,
                    category: a.category,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::UpdateBudgetItem,
            json!({
                "entityId": updated.id,
                "clientId": client.id,
                "item": updated,
            }),
            format!("Updated budget item {}", updated.name),
        ))
    }

    async fn add_vendor(
        &self,
        a: crate::domain::tools::AddVendorArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let vendor = self
            .store
            .insert_vendor(
                ctx.tenant_id,
                NewVendor {
                    client_id: client.id,
                    name: a.name,
                    service: a.service,
                    email: a.email,
                    phone: a.phone,
                    cost: a.cost,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::AddVendor,
            json!({
                "entityId": vendor.id,
                "clientId": client.id,
                "vendor": vendor,
            }),
            format!("Added vendor {}", vendor.name),
        ))
    }

    async fn update_vendor(
        &self,
        a: crate::domain::tools::UpdateVendorArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let mut matches = self
            .reader
            .vendors_matching(ctx.tenant_id, client.id, &a.name)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let vendor = match matches.len() {
            0 => return Err(ToolError::not_found("Vendor", &a.name)),
            1 => matches.remove(0),
            _ => {
                return Err(ToolError::ambiguous(
                    &a.name,
                    matches
                        .iter()
                        .map(|v| EntityCandidate::new(v.id, v.label()))
                        .collect(),
                ))
            }
        };
        let updated = self
            .store
            .update_vendor(
                ctx.tenant_id,
                vendor.id,
                VendorPatch {
                    service: a.service,
                    email: a.email,
                    phone: a.phone,
                    cost: a.cost,
                },
            )
            .await?;

        Ok(ToolExecutionResult::success(
            ToolName::UpdateVendor,
            json!({
                "entityId": updated.id,
                "clientId": client.id,
                "vendor": updated,
            }),
            format!("Updated vendor {}", updated.name),
        ))
    }

    // === Query handlers ===

    async fn list_guests(
        &self,
        a: crate::domain::tools::ListGuestsArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let guests = self
            .reader
            .guests(ctx.tenant_id, client.id, a.rsvp_status)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let count = guests.len();
        Ok(ToolExecutionResult::success(
            ToolName::ListGuests,
            json!({"clientId": client.id, "guests": guests, "count": count}),
            format!("{} guests", count),
        ))
    }

    async fn get_timeline(
        &self,
        a: crate::domain::tools::GetTimelineArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let items = self
            .reader
            .timeline_items(ctx.tenant_id, client.id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let count = items.len();
        Ok(ToolExecutionResult::success(
            ToolName::GetTimeline,
            json!({"clientId": client.id, "items": items}),
            format!("{} timeline items", count),
        ))
    }

    async fn get_budget_summary(
        &self,
        a: crate::domain::tools::GetBudgetSummaryArgs,
        ctx: &CallerContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let client = self.resolve_client(ctx, &a.client_id).await?;
        let summary = self
            .reader
            .budget_summary(ctx.tenant_id, client.id)
            .await
            .map_err(|e| ToolError::internal(e.to_string()))?;

        Ok(ToolExecutionResult::success(
            ToolName::GetBudgetSummary,
            json!({"clientId": client.id, "summary": summary}),
            "Budget summary",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPlanning;
    use crate::domain::foundation::{EntityId, TenantId, Timestamp, UserId};
    use crate::domain::planning::TimelineItemRecord;
    use crate::domain::tools::RsvpStatus;

    struct Fixture {
        planning: Arc<InMemoryPlanning>,
        dispatcher: ToolDispatcher,
        identity: RequestIdentity,
        tenant: TenantId,
    }

    fn fixture() -> Fixture {
        let planning = Arc::new(InMemoryPlanning::new());
        let tenant = TenantId::new();
        let dispatcher = ToolDispatcher::new(planning.clone(), planning.clone());
        Fixture {
            planning,
            dispatcher,
            identity: RequestIdentity::new(UserId::new("u-1"), tenant),
            tenant,
        }
    }

    fn guest(client_id: EntityId, first: &str, last: &str, seat: Option<&str>) -> GuestRecord {
        GuestRecord {
            id: EntityId::new(),
            client_id,
            first_name: first.into(),
            last_name: Some(last.into()),
            email: None,
            phone: None,
            rsvp_status: RsvpStatus::Pending,
            dietary_notes: None,
            seat_assignment: seat.map(String::from),
        }
    }

    #[tokio::test]
    async fn execute_requires_authentication() {
        let f = fixture();
        let err = f
            .dispatcher
            .execute(&ToolCall::new("add_guest", json!({})), &RequestIdentity::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn execute_rejects_unknown_tool() {
        let f = fixture();
        let err = f
            .dispatcher
            .execute(&ToolCall::new("summon_dragon", json!({})), &f.identity)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_TOOL");
    }

    #[tokio::test]
    async fn execute_rejects_reserved_tool_as_not_implemented() {
        let f = fixture();
        let err = f
            .dispatcher
            .execute(&ToolCall::new("export_guest_list", json!({})), &f.identity)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn execute_rejects_malformed_arguments() {
        let f = fixture();
        let err = f
            .dispatcher
            .execute(&ToolCall::new("add_guest", json!({"clientId": "c1"})), &f.identity)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn add_guest_fails_for_unknown_client() {
        let f = fixture();
        let err = f
            .dispatcher
            .execute(
                &ToolCall::new("add_guest", json!({"clientId": "Nobody Wedding", "firstName": "Ana"})),
                &f.identity,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn add_guest_succeeds_for_seeded_client() {
        let f = fixture();
        let client = f.planning.seed_client(f.tenant, "Silva Wedding", None);

        let result = f
            .dispatcher
            .execute(
                &ToolCall::new("add_guest", json!({"clientId": client.id.to_string(), "firstName": "Ana", "lastName": "Silva"})),
                &f.identity,
            )
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.tool_name(), ToolName::AddGuest);
        assert!(result.message().contains("Ana Silva"));
        assert!(result.data().unwrap()["entityId"].is_string());
    }

    #[tokio::test]
    async fn ambiguous_guest_reference_carries_candidates() {
        let f = fixture();
        let client = f.planning.seed_client(f.tenant, "Silva Wedding", None);
        f.planning.seed_guest(f.tenant, guest(client.id, "Ana", "Silva", None));
        f.planning.seed_guest(f.tenant, guest(client.id, "Ana", "Souza", None));

        let err = f
            .dispatcher
            .execute(
                &ToolCall::new("update_rsvp", json!({
                    "clientId": client.id.to_string(),
                    "guestName": "Ana",
                    "status": "accepted"
                })),
                &f.identity,
            )
            .await
            .unwrap_err();

        match err {
            ToolError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected Ambiguous, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn shift_timeline_shifts_all_rows_and_reports_count() {
        let f = fixture();
        let client = f.planning.seed_client(f.tenant, "Silva Wedding", None);
        let base = Timestamp::from_unix_secs(1_750_000_000);
        for i in 0..3 {
            f.planning.seed_timeline_item(
                f.tenant,
                TimelineItemRecord {
                    id: EntityId::new(),
                    client_id: client.id,
                    title: format!("Item {}", i),
                    starts_at: base.plus_minutes(i * 30),
                    ends_at: Some(base.plus_minutes(i * 30 + 20)),
                    location: None,
                },
            );
        }

        let result = f
            .dispatcher
            .execute(
                &ToolCall::new("shift_timeline", json!({"clientId": client.id.to_string(), "shiftMinutes": -15})),
                &f.identity,
            )
            .await
            .unwrap();

        assert_eq!(result.data().unwrap()["shiftedCount"], 3);

        let items = f.planning.timeline_items(f.tenant, client.id).await.unwrap();
        assert_eq!(items[0].starts_at, base.plus_minutes(-15));
        assert_eq!(items[2].starts_at, base.plus_minutes(45));
    }

    #[tokio::test]
    async fn create_client_reports_cascade_results() {
        let f = fixture();
        let result = f
            .dispatcher
            .execute(
                &ToolCall::new("create_client", json!({"name": "Silva Wedding", "totalBudget": 10000.0})),
                &f.identity,
            )
            .await
            .unwrap();

        assert_eq!(result.cascade_results().len(), 2);
        assert_eq!(result.cascade_results()[0].entity_type, "event");
        assert_eq!(result.cascade_results()[1].entity_type, "budget_allocation");
    }

    #[tokio::test]
    async fn create_client_cascade_failure_leaves_no_primary_write() {
        let f = fixture();
        f.planning.fail_next_cascade();

        let err = f
            .dispatcher
            .execute(&ToolCall::new("create_client", json!({"name": "Silva Wedding"})), &f.identity)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
        assert_eq!(f.planning.client_count(f.tenant), 0);
    }

    #[tokio::test]
    async fn list_guests_filters_by_rsvp() {
        let f = fixture();
        let client = f.planning.seed_client(f.tenant, "Silva Wedding", None);
        let mut accepted = guest(client.id, "Ana", "Silva", None);
        accepted.rsvp_status = RsvpStatus::Accepted;
        f.planning.seed_guest(f.tenant, accepted);
        f.planning.seed_guest(f.tenant, guest(client.id, "Bruno", "Costa", None));

        let result = f
            .dispatcher
            .execute(
                &ToolCall::new("list_guests", json!({"clientId": client.id.to_string(), "rsvpStatus": "accepted"})),
                &f.identity,
            )
            .await
            .unwrap();

        assert_eq!(result.data().unwrap()["count"], 1);
    }

    #[tokio::test]
    async fn transaction_conflict_surfaces_as_transaction_failed() {
        let f = fixture();
        let client = f.planning.seed_client(f.tenant, "Silva Wedding", None);
        f.planning.fail_with_conflicts(1);

        let err = f
            .dispatcher
            .execute(
                &ToolCall::new("add_guest", json!({"clientId": client.id.to_string(), "firstName": "Ana"})),
                &f.identity,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TRANSACTION_FAILED");
    }
}
