//! Planning read-models: the entity shapes the pipeline reads and writes.
//!
//! These are deliberately thin records, not aggregates. The individual
//! mutation bodies are domain glue around the execution pipeline, and
//! the relational schema itself is an external collaborator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EntityId, Timestamp};
use crate::domain::tools::RsvpStatus;

/// A client (e.g. a wedding) resolved from a caller-supplied reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: EntityId,
    pub name: String,
}

impl ClientRef {
    /// Creates a new client reference.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A guest row as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub id: EntityId,
    pub client_id: EntityId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub dietary_notes: Option<String>,
    /// Seat assignment label, if the guest has been seated.
    pub seat_assignment: Option<String>,
}

impl GuestRecord {
    /// Full display name.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Display label used in ambiguity candidate lists.
    pub fn label(&self) -> String {
        match &self.email {
            Some(email) => format!("{} <{}>", self.full_name(), email),
            None => self.full_name(),
        }
    }
}

/// A timeline row as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItemRecord {
    pub id: EntityId,
    pub client_id: EntityId,
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
}

/// A budget row as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemRecord {
    pub id: EntityId,
    pub client_id: EntityId,
    pub name: String,
    pub amount: f64,
    pub paid: bool,
    pub category: Option<String>,
    pub vendor_name: Option<String>,
}

/// A vendor row as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: EntityId,
    pub client_id: EntityId,
    pub name: String,
    pub service: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cost: Option<f64>,
}

impl VendorRecord {
    /// Display label used in ambiguity candidate lists.
    pub fn label(&self) -> String {
        match &self.service {
            Some(service) => format!("{} ({})", self.name, service),
            None => self.name.clone(),
        }
    }
}

/// Aggregated budget totals for a client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Total budget the client set, if any.
    pub total_budget: Option<f64>,
    /// Sum of all budget item amounts.
    pub allocated: f64,
    /// Sum of paid item amounts.
    pub paid: f64,
}

impl BudgetSummary {
    /// Remaining headroom against the total budget, if one is set.
    pub fn remaining(&self) -> Option<f64> {
        self.total_budget.map(|total| total - self.allocated)
    }

    /// True when allocation exceeds the total budget.
    pub fn is_over_budget(&self) -> bool {
        matches!(self.remaining(), Some(r) if r < 0.0)
    }
}
