//! Typed, validated argument structs for every tool.
//!
//! Arguments arrive from the model as an untyped JSON object and are
//! parsed exactly once at the dispatch boundary. Handlers receive the
//! typed struct and never touch raw JSON. Wire keys are camelCase, as
//! the model emits them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ToolError};

use super::ToolName;

/// RSVP status of a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientArgs {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub event_date: Option<Timestamp>,
    #[serde(default)]
    pub total_budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGuestArgs {
    /// Client reference: id or free-text name, resolved by the handler.
    pub client_id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGuestArgs {
    pub client_id: String,
    /// Free-text guest reference, resolved against the tenant's guests.
    pub guest_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveGuestArgs {
    pub client_id: String,
    pub guest_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRsvpArgs {
    pub client_id: String,
    pub guest_name: String,
    pub status: RsvpStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTimelineItemArgs {
    pub client_id: String,
    pub title: String,
    pub starts_at: Timestamp,
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTimelineArgs {
    pub client_id: String,
    /// Positive shifts later, negative shifts earlier.
    pub shift_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTimelineItemArgs {
    pub client_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBudgetItemArgs {
    pub client_id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetItemArgs {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVendorArgs {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorArgs {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGuestsArgs {
    pub client_id: String,
    #[serde(default)]
    pub rsvp_status: Option<RsvpStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTimelineArgs {
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBudgetSummaryArgs {
    pub client_id: String,
}

/// Parsed arguments for exactly one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    CreateClient(CreateClientArgs),
    AddGuest(AddGuestArgs),
    UpdateGuest(UpdateGuestArgs),
    RemoveGuest(RemoveGuestArgs),
    UpdateRsvp(UpdateRsvpArgs),
    AddTimelineItem(AddTimelineItemArgs),
    ShiftTimeline(ShiftTimelineArgs),
    RemoveTimelineItem(RemoveTimelineItemArgs),
    AddBudgetItem(AddBudgetItemArgs),
    UpdateBudgetItem(UpdateBudgetItemArgs),
    AddVendor(AddVendorArgs),
    UpdateVendor(UpdateVendorArgs),
    ListGuests(ListGuestsArgs),
    GetTimeline(GetTimelineArgs),
    GetBudgetSummary(GetBudgetSummaryArgs),
}

impl ToolArgs {
    /// Parses and validates the raw argument object for a tool.
    ///
    /// Fails with `BadRequest` when the object is missing required
    /// fields, has the wrong shape, or fails semantic validation.
    pub fn parse(tool: ToolName, raw: &serde_json::Value) -> Result<Self, ToolError> {
        if !raw.is_object() {
            return Err(ToolError::bad_request(format!(
                "Arguments for {} must be a JSON object",
                tool
            )));
        }

        fn de<T: serde::de::DeserializeOwned>(
            tool: ToolName,
            raw: &serde_json::Value,
        ) -> Result<T, ToolError> {
            serde_json::from_value(raw.clone()).map_err(|e| {
                ToolError::bad_request(format!("Invalid arguments for {}: {}", tool, e))
            })
        }

        let args = match tool {
            ToolName::CreateClient => Self::CreateClient(de(tool, raw)?),
            ToolName::AddGuest => Self::AddGuest(de(tool, raw)?),
            ToolName::UpdateGuest => Self::UpdateGuest(de(tool, raw)?),
            ToolName::RemoveGuest => Self::RemoveGuest(de(tool, raw)?),
            ToolName::UpdateRsvp => Self::UpdateRsvp(de(tool, raw)?),
            ToolName::AddTimelineItem => Self::AddTimelineItem(de(tool, raw)?),
            ToolName::ShiftTimeline => Self::ShiftTimeline(de(tool, raw)?),
            ToolName::RemoveTimelineItem => Self::RemoveTimelineItem(de(tool, raw)?),
            ToolName::AddBudgetItem => Self::AddBudgetItem(de(tool, raw)?),
            ToolName::UpdateBudgetItem => Self::UpdateBudgetItem(de(tool, raw)?),
            ToolName::AddVendor => Self::AddVendor(de(tool, raw)?),
            ToolName::UpdateVendor => Self::UpdateVendor(de(tool, raw)?),
            ToolName::ListGuests => Self::ListGuests(de(tool, raw)?),
            ToolName::GetTimeline => Self::GetTimeline(de(tool, raw)?),
            ToolName::GetBudgetSummary => Self::GetBudgetSummary(de(tool, raw)?),
        };
        args.validate()?;
        Ok(args)
    }

    /// The tool these arguments belong to.
    pub fn tool(&self) -> ToolName {
        match self {
            Self::CreateClient(_) => ToolName::CreateClient,
            Self::AddGuest(_) => ToolName::AddGuest,
            Self::UpdateGuest(_) => ToolName::UpdateGuest,
            Self::RemoveGuest(_) => ToolName::RemoveGuest,
            Self::UpdateRsvp(_) => ToolName::UpdateRsvp,
            Self::AddTimelineItem(_) => ToolName::AddTimelineItem,
            Self::ShiftTimeline(_) => ToolName::ShiftTimeline,
            Self::RemoveTimelineItem(_) => ToolName::RemoveTimelineItem,
            Self::AddBudgetItem(_) => ToolName::AddBudgetItem,
            Self::UpdateBudgetItem(_) => ToolName::UpdateBudgetItem,
            Self::AddVendor(_) => ToolName::AddVendor,
            Self::UpdateVendor(_) => ToolName::UpdateVendor,
            Self::ListGuests(_) => ToolName::ListGuests,
            Self::GetTimeline(_) => ToolName::GetTimeline,
            Self::GetBudgetSummary(_) => ToolName::GetBudgetSummary,
        }
    }

    fn validate(&self) -> Result<(), ToolError> {
        match self {
            Self::CreateClient(a) => {
                require_non_empty("name", &a.name)?;
                if let Some(budget) = a.total_budget {
                    require_non_negative("totalBudget", budget)?;
                }
            }
            Self::AddGuest(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("firstName", &a.first_name)?;
            }
            Self::UpdateGuest(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("guestName", &a.guest_name)?;
                if a.first_name.is_none()
                    && a.last_name.is_none()
                    && a.email.is_none()
                    && a.phone.is_none()
                    && a.dietary_notes.is_none()
                {
                    return Err(ToolError::bad_request(
                        "update_guest requires at least one field to change",
                    ));
                }
            }
            Self::RemoveGuest(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("guestName", &a.guest_name)?;
            }
            Self::UpdateRsvp(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("guestName", &a.guest_name)?;
            }
            Self::AddTimelineItem(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("title", &a.title)?;
                if let Some(ends_at) = &a.ends_at {
                    if ends_at.is_before(&a.starts_at) {
                        return Err(ToolError::bad_request("endsAt must not precede startsAt"));
                    }
                }
            }
            Self::ShiftTimeline(a) => {
                require_non_empty("clientId", &a.client_id)?;
                if a.shift_minutes == 0 {
                    return Err(ToolError::bad_request("shiftMinutes must be non-zero"));
                }
            }
            Self::RemoveTimelineItem(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("title", &a.title)?;
            }
            Self::AddBudgetItem(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("name", &a.name)?;
                require_non_negative("amount", a.amount)?;
            }
            Self::UpdateBudgetItem(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("name", &a.name)?;
                if let Some(amount) = a.amount {
                    require_non_negative("amount", amount)?;
                }
            }
            Self::AddVendor(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("name", &a.name)?;
                if let Some(cost) = a.cost {
                    require_non_negative("cost", cost)?;
                }
            }
            Self::UpdateVendor(a) => {
                require_non_empty("clientId", &a.client_id)?;
                require_non_empty("name", &a.name)?;
            }
            Self::ListGuests(a) => require_non_empty("clientId", &a.client_id)?,
            Self::GetTimeline(a) => require_non_empty("clientId", &a.client_id)?,
            Self::GetBudgetSummary(a) => require_non_empty("clientId", &a.client_id)?,
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::bad_request(format!(
            "Field '{}' cannot be empty",
            field
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ToolError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ToolError::bad_request(format!(
            "Field '{}' must be a non-negative number",
            field
        )));
    }
    Ok(())
}
