//! In-memory planning store and reader.
//!
//! Backs unit and integration tests with deterministic, lock-based
//! state, and mirrors the transactional contract of the Postgres
//! adapter: every mutation is staged against a copy of the state and
//! only swapped in when the whole operation succeeds, so a failing
//! cascade leaves nothing behind.
//!
//! # Failure injection
//!
//! Tests can force the next N operations to fail with a retryable
//! conflict (`fail_with_conflicts`) or force the cascade step of
//! `create_client_with_defaults` to fail (`fail_next_cascade`). The
//! conflict counter decrements per attempt, which makes retry behavior
//! observable.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{EntityId, TenantId};
use crate::domain::planning::{
    BudgetItemRecord, BudgetSummary, ClientRef, GuestRecord, TimelineItemRecord, VendorRecord,
};
use crate::domain::tools::RsvpStatus;
use crate::ports::{
    BudgetItemPatch, ClientCascade, GuestPatch, NewBudgetItem, NewClient, NewGuest,
    NewTimelineItem, NewVendor, PlanningReader, PlanningStore, StoreError, VendorPatch,
};

/// One tenant's worth of planning data.
#[derive(Debug, Clone, Default)]
struct TenantState {
    clients: HashMap<EntityId, ClientState>,
}

#[derive(Debug, Clone)]
struct ClientState {
    client: ClientRef,
    total_budget: Option<f64>,
    guests: Vec<GuestRecord>,
    timeline: Vec<TimelineItemRecord>,
    budget_items: Vec<BudgetItemRecord>,
    vendors: Vec<VendorRecord>,
}

/// In-memory implementation of [`PlanningStore`] and [`PlanningReader`].
#[derive(Default)]
pub struct InMemoryPlanning {
    state: RwLock<HashMap<TenantId, TenantState>>,
    conflicts_remaining: AtomicU32,
    fail_next_cascade: AtomicBool,
}

impl InMemoryPlanning {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a client with an optional total budget; returns its ref.
    pub fn seed_client(
        &self,
        tenant_id: TenantId,
        name: &str,
        total_budget: Option<f64>,
    ) -> ClientRef {
        let client = ClientRef::new(EntityId::new(), name);
        let mut state = self.state.write().expect("planning state lock poisoned");
        state
            .entry(tenant_id)
            .or_default()
            .clients
            .insert(
                client.id,
                ClientState {
                    client: client.clone(),
                    total_budget,
                    guests: Vec::new(),
                    timeline: Vec::new(),
                    budget_items: Vec::new(),
                    vendors: Vec::new(),
                },
            );
        client
    }

    /// Seeds a guest directly (test setup).
    pub fn seed_guest(&self, tenant_id: TenantId, guest: GuestRecord) {
        let mut state = self.state.write().expect("planning state lock poisoned");
        if let Some(client) = state
            .entry(tenant_id)
            .or_default()
            .clients
            .get_mut(&guest.client_id)
        {
            client.guests.push(guest);
        }
    }

    /// Seeds a timeline item directly (test setup).
    pub fn seed_timeline_item(&self, tenant_id: TenantId, item: TimelineItemRecord) {
        let mut state = self.state.write().expect("planning state lock poisoned");
        if let Some(client) = state
            .entry(tenant_id)
            .or_default()
            .clients
            .get_mut(&item.client_id)
        {
            client.timeline.push(item);
        }
    }

    /// Seeds a budget item directly (test setup).
    pub fn seed_budget_item(&self, tenant_id: TenantId, item: BudgetItemRecord) {
        let mut state = self.state.write().expect("planning state lock poisoned");
        if let Some(client) = state
            .entry(tenant_id)
            .or_default()
            .clients
            .get_mut(&item.client_id)
        {
            client.budget_items.push(item);
        }
    }

    /// Seeds a vendor directly (test setup).
    pub fn seed_vendor(&self, tenant_id: TenantId, vendor: VendorRecord) {
        let mut state = self.state.write().expect("planning state lock poisoned");
        if let Some(client) = state
            .entry(tenant_id)
            .or_default()
            .clients
            .get_mut(&vendor.client_id)
        {
            client.vendors.push(vendor);
        }
    }

    /// Makes the next `n` mutations fail with a retryable conflict.
    pub fn fail_with_conflicts(&self, n: u32) {
        self.conflicts_remaining.store(n, Ordering::SeqCst);
    }

    /// Makes the cascade step of the next `create_client_with_defaults`
    /// fail after the primary write has been staged.
    pub fn fail_next_cascade(&self) {
        self.fail_next_cascade.store(true, Ordering::SeqCst);
    }

    /// Number of clients stored for a tenant (test assertions).
    pub fn client_count(&self, tenant_id: TenantId) -> usize {
        self.state
            .read()
            .expect("planning state lock poisoned")
            .get(&tenant_id)
            .map(|t| t.clients.len())
            .unwrap_or(0)
    }

    fn take_conflict(&self) -> bool {
        self.conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Runs a mutation against a staged copy of the tenant state and
    /// swaps it in only on success.
    fn mutate<T>(
        &self,
        tenant_id: TenantId,
        f: impl FnOnce(&mut TenantState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if self.take_conflict() {
            return Err(StoreError::transaction("serialization failure (injected)"));
        }

        let mut state = self.state.write().expect("planning state lock poisoned");
        let mut staged = state.get(&tenant_id).cloned().unwrap_or_default();
        let result = f(&mut staged)?;
        state.insert(tenant_id, staged);
        Ok(result)
    }

    fn read<T>(
        &self,
        tenant_id: TenantId,
        f: impl FnOnce(&TenantState) -> T,
    ) -> T {
        let state = self.state.read().expect("planning state lock poisoned");
        let empty = TenantState::default();
        f(state.get(&tenant_id).unwrap_or(&empty))
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn client_mut<'a>(
    state: &'a mut TenantState,
    client_id: EntityId,
) -> Result<&'a mut ClientState, StoreError> {
    state
        .clients
        .get_mut(&client_id)
        .ok_or_else(|| StoreError::not_found("Client"))
}

#[async_trait]
impl PlanningStore for InMemoryPlanning {
    async fn create_client_with_defaults(
        &self,
        tenant_id: TenantId,
        client: NewClient,
    ) -> Result<ClientCascade, StoreError> {
        let fail_cascade = self.fail_next_cascade.swap(false, Ordering::SeqCst);

        self.mutate(tenant_id, |state| {
            let client_ref = ClientRef::new(EntityId::new(), client.name.clone());
            state.clients.insert(
                client_ref.id,
                ClientState {
                    client: client_ref.clone(),
                    total_budget: client.total_budget,
                    guests: Vec::new(),
                    timeline: Vec::new(),
                    budget_items: Vec::new(),
                    vendors: Vec::new(),
                },
            );

            if fail_cascade {
                return Err(StoreError::storage("cascade write failed (injected)"));
            }

            Ok(ClientCascade {
                client: client_ref,
                event_id: EntityId::new(),
                budget_allocation_id: EntityId::new(),
            })
        })
    }

    async fn insert_guest(
        &self,
        tenant_id: TenantId,
        guest: NewGuest,
    ) -> Result<GuestRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            let client = client_mut(state, guest.client_id)?;
            let record = GuestRecord {
                id: EntityId::new(),
                client_id: guest.client_id,
                first_name: guest.first_name,
                last_name: guest.last_name,
                email: guest.email,
                phone: guest.phone,
                rsvp_status: RsvpStatus::Pending,
                dietary_notes: guest.dietary_notes,
                seat_assignment: None,
            };
            client.guests.push(record.clone());
            Ok(record)
        })
    }

    async fn update_guest(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        patch: GuestPatch,
    ) -> Result<GuestRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                if let Some(guest) = client.guests.iter_mut().find(|g| g.id == guest_id) {
                    if let Some(v) = patch.first_name {
                        guest.first_name = v;
                    }
                    if let Some(v) = patch.last_name {
                        guest.last_name = Some(v);
                    }
                    if let Some(v) = patch.email {
                        guest.email = Some(v);
                    }
                    if let Some(v) = patch.phone {
                        guest.phone = Some(v);
                    }
                    if let Some(v) = patch.dietary_notes {
                        guest.dietary_notes = Some(v);
                    }
                    return Ok(guest.clone());
                }
            }
            Err(StoreError::not_found("Guest"))
        })
    }

    async fn remove_guest(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
    ) -> Result<(), StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                let before = client.guests.len();
                client.guests.retain(|g| g.id != guest_id);
                if client.guests.len() < before {
                    return Ok(());
                }
            }
            Err(StoreError::not_found("Guest"))
        })
    }

    async fn set_rsvp(
        &self,
        tenant_id: TenantId,
        guest_id: EntityId,
        status: RsvpStatus,
    ) -> Result<GuestRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                if let Some(guest) = client.guests.iter_mut().find(|g| g.id == guest_id) {
                    guest.rsvp_status = status;
                    return Ok(guest.clone());
                }
            }
            Err(StoreError::not_found("Guest"))
        })
    }

    async fn insert_timeline_item(
        &self,
        tenant_id: TenantId,
        item: NewTimelineItem,
    ) -> Result<TimelineItemRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            let client = client_mut(state, item.client_id)?;
            let record = TimelineItemRecord {
                id: EntityId::new(),
                client_id: item.client_id,
                title: item.title,
                starts_at: item.starts_at,
                ends_at: item.ends_at,
                location: item.location,
            };
            client.timeline.push(record.clone());
            Ok(record)
        })
    }

    async fn remove_timeline_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
    ) -> Result<(), StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                let before = client.timeline.len();
                client.timeline.retain(|i| i.id != item_id);
                if client.timeline.len() < before {
                    return Ok(());
                }
            }
            Err(StoreError::not_found("Timeline item"))
        })
    }

    async fn shift_timeline(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        minutes: i64,
    ) -> Result<u64, StoreError> {
        self.mutate(tenant_id, |state| {
            let client = client_mut(state, client_id)?;
            for item in &mut client.timeline {
                item.starts_at = item.starts_at.plus_minutes(minutes);
                item.ends_at = item.ends_at.map(|t| t.plus_minutes(minutes));
            }
            Ok(client.timeline.len() as u64)
        })
    }

    async fn insert_budget_item(
        &self,
        tenant_id: TenantId,
        item: NewBudgetItem,
    ) -> Result<BudgetItemRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            let client = client_mut(state, item.client_id)?;
            let record = BudgetItemRecord {
                id: EntityId::new(),
                client_id: item.client_id,
                name: item.name,
                amount: item.amount,
                paid: false,
                category: item.category,
                vendor_name: item.vendor_name,
            };
            client.budget_items.push(record.clone());
            Ok(record)
        })
    }

    async fn update_budget_item(
        &self,
        tenant_id: TenantId,
        item_id: EntityId,
        patch: BudgetItemPatch,
    ) -> Result<BudgetItemRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                if let Some(item) = client.budget_items.iter_mut().find(|i| i.id == item_id) {
                    if let Some(v) = patch.amount {
                        item.amount = v;
                    }
                    if let Some(v) = patch.paid {
                        item.paid = v;
                    }
                    if let Some(v) = patch.category {
                        item.category = Some(v);
                    }
                    return Ok(item.clone());
                }
            }
            Err(StoreError::not_found("Budget item"))
        })
    }

    async fn insert_vendor(
        &self,
        tenant_id: TenantId,
        vendor: NewVendor,
    ) -> Result<VendorRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            let client = client_mut(state, vendor.client_id)?;
            let record = VendorRecord {
                id: EntityId::new(),
                client_id: vendor.client_id,
                name: vendor.name,
                service: vendor.service,
                email: vendor.email,
                phone: vendor.phone,
                cost: vendor.cost,
            };
            client.vendors.push(record.clone());
            Ok(record)
        })
    }

    async fn update_vendor(
        &self,
        tenant_id: TenantId,
        vendor_id: EntityId,
        patch: VendorPatch,
    ) -> Result<VendorRecord, StoreError> {
        self.mutate(tenant_id, |state| {
            for client in state.clients.values_mut() {
                if let Some(vendor) = client.vendors.iter_mut().find(|v| v.id == vendor_id) {
                    if let Some(v) = patch.service {
                        vendor.service = Some(v);
                    }
                    if let Some(v) = patch.email {
                        vendor.email = Some(v);
                    }
                    if let Some(v) = patch.phone {
                        vendor.phone = Some(v);
                    }
                    if let Some(v) = patch.cost {
                        vendor.cost = Some(v);
                    }
                    return Ok(vendor.clone());
                }
            }
            Err(StoreError::not_found("Vendor"))
        })
    }
}

#[async_trait]
impl PlanningReader for InMemoryPlanning {
    async fn resolve_client(
        &self,
        tenant_id: TenantId,
        reference: &str,
    ) -> Result<Option<ClientRef>, StoreError> {
        Ok(self.read(tenant_id, |state| {
            if let Ok(id) = reference.parse::<EntityId>() {
                if let Some(client) = state.clients.get(&id) {
                    return Some(client.client.clone());
                }
            }
            let needle = normalize(reference);
            state
                .clients
                .values()
                .find(|c| normalize(&c.client.name) == needle)
                .map(|c| c.client.clone())
        }))
    }

    async fn guests_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        let needle = normalize(query);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.guests
                        .iter()
                        .filter(|g| {
                            normalize(&g.full_name()) == needle
                                || normalize(&g.first_name) == needle
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn find_guest_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        let needle = normalize(full_name);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.guests
                        .iter()
                        .filter(|g| {
                            normalize(&g.full_name()) == needle
                                || (email.is_some() && g.email.as_deref() == email)
                                || (phone.is_some() && g.phone.as_deref() == phone)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn guests(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        rsvp_status: Option<RsvpStatus>,
    ) -> Result<Vec<GuestRecord>, StoreError> {
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.guests
                        .iter()
                        .filter(|g| rsvp_status.map_or(true, |s| g.rsvp_status == s))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn timeline_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<TimelineItemRecord>, StoreError> {
        Ok(self.read(tenant_id, |state| {
            let mut items: Vec<_> = state
                .clients
                .get(&client_id)
                .map(|c| c.timeline.clone())
                .unwrap_or_default();
            items.sort_by_key(|i| i.starts_at);
            items
        }))
    }

    async fn timeline_items_titled(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        title: &str,
    ) -> Result<Vec<TimelineItemRecord>, StoreError> {
        let needle = normalize(title);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.timeline
                        .iter()
                        .filter(|i| normalize(&i.title) == needle)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn budget_items(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<Vec<BudgetItemRecord>, StoreError> {
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| c.budget_items.clone())
                .unwrap_or_default()
        }))
    }

    async fn budget_items_named(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
    ) -> Result<Vec<BudgetItemRecord>, StoreError> {
        let needle = normalize(name);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.budget_items
                        .iter()
                        .filter(|i| normalize(&i.name) == needle)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn budget_summary(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
    ) -> Result<BudgetSummary, StoreError> {
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| BudgetSummary {
                    total_budget: c.total_budget,
                    allocated: c.budget_items.iter().map(|i| i.amount).sum(),
                    paid: c
                        .budget_items
                        .iter()
                        .filter(|i| i.paid)
                        .map(|i| i.amount)
                        .sum(),
                })
                .unwrap_or(BudgetSummary {
                    total_budget: None,
                    allocated: 0.0,
                    paid: 0.0,
                })
        }))
    }

    async fn vendors_matching(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        query: &str,
    ) -> Result<Vec<VendorRecord>, StoreError> {
        let needle = normalize(query);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.vendors
                        .iter()
                        .filter(|v| normalize(&v.name) == needle)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn find_vendor_duplicates(
        &self,
        tenant_id: TenantId,
        client_id: EntityId,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<VendorRecord>, StoreError> {
        let needle = normalize(name);
        Ok(self.read(tenant_id, |state| {
            state
                .clients
                .get(&client_id)
                .map(|c| {
                    c.vendors
                        .iter()
                        .filter(|v| {
                            normalize(&v.name) == needle
                                || (email.is_some() && v.email.as_deref() == email)
                                || (phone.is_some() && v.phone.as_deref() == phone)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_guest(client_id: EntityId, first: &str, last: Option<&str>) -> NewGuest {
        NewGuest {
            client_id,
            first_name: first.into(),
            last_name: last.map(String::from),
            email: None,
            phone: None,
            side: None,
            dietary_notes: None,
        }
    }

    #[tokio::test]
    async fn insert_and_list_guests() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        let client = planning.seed_client(tenant, "Silva Wedding", None);

        planning
            .insert_guest(tenant, new_guest(client.id, "Ana", Some("Silva")))
            .await
            .unwrap();

        let guests = planning.guests(tenant, client.id, None).await.unwrap();
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].full_name(), "Ana Silva");
    }

    #[tokio::test]
    async fn resolve_client_by_id_and_name() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        let client = planning.seed_client(tenant, "Silva Wedding", None);

        let by_id = planning
            .resolve_client(tenant, &client.id.to_string())
            .await
            .unwrap();
        assert_eq!(by_id.unwrap().id, client.id);

        let by_name = planning
            .resolve_client(tenant, "silva wedding")
            .await
            .unwrap();
        assert_eq!(by_name.unwrap().id, client.id);

        let missing = planning.resolve_client(tenant, "nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn injected_conflict_fails_then_clears() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        let client = planning.seed_client(tenant, "Silva Wedding", None);
        planning.fail_with_conflicts(1);

        let first = planning
            .insert_guest(tenant, new_guest(client.id, "Ana", None))
            .await;
        assert!(matches!(first, Err(StoreError::TransactionFailed(_))));

        let second = planning
            .insert_guest(tenant, new_guest(client.id, "Ana", None))
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn failed_cascade_leaves_no_client_behind() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        planning.fail_next_cascade();

        let result = planning
            .create_client_with_defaults(
                tenant,
                NewClient {
                    name: "Silva Wedding".into(),
                    email: None,
                    phone: None,
                    event_date: None,
                    total_budget: Some(10_000.0),
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(planning.client_count(tenant), 0);
    }

    #[tokio::test]
    async fn shift_timeline_moves_every_item() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        let client = planning.seed_client(tenant, "Silva Wedding", None);
        let base = crate::domain::foundation::Timestamp::from_unix_secs(1_700_000_000);
        for i in 0..3 {
            planning.seed_timeline_item(
                tenant,
                TimelineItemRecord {
                    id: EntityId::new(),
                    client_id: client.id,
                    title: format!("Item {}", i),
                    starts_at: base.plus_minutes(i * 60),
                    ends_at: Some(base.plus_minutes(i * 60 + 30)),
                    location: None,
                },
            );
        }

        let shifted = planning.shift_timeline(tenant, client.id, -15).await.unwrap();
        assert_eq!(shifted, 3);

        let items = planning.timeline_items(tenant, client.id).await.unwrap();
        assert_eq!(items[0].starts_at, base.plus_minutes(-15));
        assert_eq!(items[0].ends_at.unwrap(), base.plus_minutes(15));
    }

    #[tokio::test]
    async fn budget_summary_aggregates_items() {
        let planning = InMemoryPlanning::new();
        let tenant = TenantId::new();
        let client = planning.seed_client(tenant, "Silva Wedding", Some(10_000.0));
        planning
            .insert_budget_item(
                tenant,
                NewBudgetItem {
                    client_id: client.id,
                    name: "Flowers".into(),
                    amount: 1_200.0,
                    category: None,
                    vendor_name: None,
                },
            )
            .await
            .unwrap();

        let summary = planning.budget_summary(tenant, client.id).await.unwrap();
        assert_eq!(summary.total_budget, Some(10_000.0));
        assert_eq!(summary.allocated, 1_200.0);
        assert_eq!(summary.paid, 0.0);
    }
}
