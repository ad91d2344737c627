//! Caller context attached to every tool call.
//!
//! Authentication is handled upstream; by the time a call reaches the
//! dispatcher it carries a pre-validated identity and tenant. The
//! dispatcher only checks that both are present.

use serde::{Deserialize, Serialize};

use super::{TenantId, ToolError, UserId};

/// Identity as it arrives at the boundary: either field may be absent
/// when the upstream layer failed to attach it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestIdentity {
    /// Authenticated user, if attached.
    pub user_id: Option<UserId>,
    /// Owning tenant, if attached.
    pub tenant_id: Option<TenantId>,
}

impl RequestIdentity {
    /// Creates an identity with both fields present.
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id: Some(user_id),
            tenant_id: Some(tenant_id),
        }
    }

    /// Upgrades to a full caller context, failing with
    /// [`ToolError::Unauthenticated`] if either field is missing.
    pub fn require(&self) -> Result<CallerContext, ToolError> {
        match (&self.user_id, &self.tenant_id) {
            (Some(user_id), Some(tenant_id)) => Ok(CallerContext {
                user_id: user_id.clone(),
                tenant_id: *tenant_id,
            }),
            _ => Err(ToolError::Unauthenticated),
        }
    }
}

/// Fully-validated caller context: who is calling and which tenant's
/// data the call operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerContext {
    /// The authenticated user.
    pub user_id: UserId,
    /// The tenant whose data is in scope.
    pub tenant_id: TenantId,
}

impl CallerContext {
    /// Creates a new caller context.
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self { user_id, tenant_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_succeeds_with_both_fields() {
        let identity = RequestIdentity::new(UserId::new("u-1"), TenantId::new());
        let ctx = identity.require().unwrap();
        assert_eq!(ctx.user_id.as_str(), "u-1");
    }

    #[test]
    fn require_fails_without_user() {
        let identity = RequestIdentity {
            user_id: None,
            tenant_id: Some(TenantId::new()),
        };
        assert!(matches!(
            identity.require(),
            Err(ToolError::Unauthenticated)
        ));
    }

    #[test]
    fn require_fails_without_tenant() {
        let identity = RequestIdentity {
            user_id: Some(UserId::new("u-1")),
            tenant_id: None,
        };
        assert!(matches!(
            identity.require(),
            Err(ToolError::Unauthenticated)
        ));
    }
}
