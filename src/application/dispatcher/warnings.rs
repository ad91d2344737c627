//! Tool-specific warning checks for previews.
//!
//! Each check is independent and additive: a tool may accumulate
//! warnings from several checks. Checks are advisory: a reader failure
//! during a check is logged and the check skipped, never failing the
//! preview itself.

use tracing::warn;

use crate::domain::foundation::{TenantId, Timestamp};
use crate::domain::planning::ClientRef;
use crate::domain::tools::{RsvpStatus, ToolArgs};
use crate::ports::PlanningReader;

use super::format::format_currency;

/// Runs every check that applies to the given call and returns the
/// accumulated warnings.
pub async fn collect_warnings(
    reader: &dyn PlanningReader,
    tenant_id: TenantId,
    client: Option<&ClientRef>,
    args: &ToolArgs,
) -> Vec<String> {
    let mut warnings = Vec::new();

    match args {
        ToolArgs::CreateClient(a) => {
            if let Some(event_date) = &a.event_date {
                check_past_date(&mut warnings, "event date", event_date);
            }
        }
        ToolArgs::AddGuest(a) => {
            if let Some(client) = client {
                let full_name = match &a.last_name {
                    Some(last) => format!("{} {}", a.first_name, last),
                    None => a.first_name.clone(),
                };
                match reader
                    .find_guest_duplicates(
                        tenant_id,
                        client.id,
                        &full_name,
                        a.email.as_deref(),
                        a.phone.as_deref(),
                    )
                    .await
                {
                    Ok(duplicates) => {
                        for dup in duplicates {
                            warnings.push(format!(
                                "A guest that looks like a duplicate already exists: {}",
                                dup.label()
                            ));
                        }
                    }
                    Err(e) => warn!(error = %e, "duplicate guest check skipped"),
                }
            }
        }
        ToolArgs::UpdateRsvp(a) => {
            if a.status == RsvpStatus::Declined {
                if let Some(client) = client {
                    match reader
                        .guests_matching(tenant_id, client.id, &a.guest_name)
                        .await
                    {
                        Ok(guests) => {
                            if let [guest] = guests.as_slice() {
                                if let Some(seat) = &guest.seat_assignment {
                                    warnings.push(format!(
                                        "{} has a seat assignment ({}); declining affects seating",
                                        guest.full_name(),
                                        seat
                                    ));
                                }
                            }
                        }
                        Err(e) => warn!(error = %e, "seating impact check skipped"),
                    }
                }
            }
        }
        ToolArgs::AddTimelineItem(a) => {
            check_past_date(&mut warnings, "start time", &a.starts_at);
        }
        ToolArgs::AddBudgetItem(a) => {
            if let Some(client) = client {
                check_budget_overrun(reader, tenant_id, client, a.amount, &mut warnings).await;
            }
        }
        ToolArgs::UpdateBudgetItem(a) => {
            if let (Some(client), Some(new_amount)) = (client, a.amount) {
                let previous = match reader
                    .budget_items_named(tenant_id, client.id, &a.name)
                    .await
                {
                    Ok(items) => items.first().map(|item| item.amount).unwrap_or(0.0),
                    Err(e) => {
                        warn!(error = %e, "budget overrun check skipped");
                        return warnings;
                    }
                };
                check_budget_overrun(reader, tenant_id, client, new_amount - previous, &mut warnings)
                    .await;
            }
        }
        ToolArgs::AddVendor(a) => {
            if let Some(client) = client {
                match reader
                    .find_vendor_duplicates(
                        tenant_id,
                        client.id,
                        &a.name,
                        a.email.as_deref(),
                        a.phone.as_deref(),
                    )
                    .await
                {
                    Ok(duplicates) => {
                        for dup in duplicates {
                            warnings.push(format!(
                                "A vendor that looks like a duplicate already exists: {}",
                                dup.label()
                            ));
                        }
                    }
                    Err(e) => warn!(error = %e, "duplicate vendor check skipped"),
                }
                if let Some(cost) = a.cost {
                    check_budget_overrun(reader, tenant_id, client, cost, &mut warnings).await;
                }
            }
        }
        _ => {}
    }

    warnings
}

fn check_past_date(warnings: &mut Vec<String>, what: &str, date: &Timestamp) {
    if date.is_past() {
        warnings.push(format!("The {} is in the past", what));
    }
}

async fn check_budget_overrun(
    reader: &dyn PlanningReader,
    tenant_id: TenantId,
    client: &ClientRef,
    added_amount: f64,
    warnings: &mut Vec<String>,
) {
    let summary = match reader.budget_summary(tenant_id, client.id).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "budget overrun check skipped");
            return;
        }
    };

    if let Some(total) = summary.total_budget {
        let projected = summary.allocated + added_amount;
        if projected > total {
            warnings.push(format!(
                "Projected spend {} exceeds the total budget {}",
                format_currency(projected),
                format_currency(total)
            ));
        }
    }
}
