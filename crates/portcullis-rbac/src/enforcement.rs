//! Access decisions.
//!
//! Two decision modes, both working on an already-resolved [`RoleSet`]:
//!
//! - **Admin**: allow iff the roles intersect [`ADMIN_ROLES`]. Never
//!   touches the store.
//! - **Permission**: allow iff `super_admin` is held or the
//!   [`PermissionResolver`] finds a grant.
//!
//! The two are independent. The usual composition gates on admin first and
//! on the permission second, but either can be used alone.

use portcullis_store::AccessStore;
use portcullis_types::{ADMIN_ROLES, PermissionName, PrincipalId, RoleSet};
use tracing::{info, warn};

use crate::error::{AccessError, Result};
use crate::permissions::PermissionResolver;

/// Why a decision denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NotAdmin,
    MissingPermission(PermissionName),
}

/// Outcome of a single decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts a denial into the matching forbidden error.
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::NotAdmin) => Err(AccessError::ForbiddenNotAdmin),
            Decision::Deny(DenyReason::MissingPermission(permission)) => {
                Err(AccessError::missing_permission(permission))
            }
        }
    }
}

/// Composes role and permission resolution into allow/deny decisions.
///
/// Holds no state between calls beyond the store handle and the audit
/// switch.
pub struct AccessDecisionEngine<'a, S: ?Sized> {
    permissions: PermissionResolver<'a, S>,

    /// Whether to log decisions.
    audit_enabled: bool,
}

impl<'a, S: AccessStore + ?Sized> AccessDecisionEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            permissions: PermissionResolver::new(store),
            audit_enabled: true,
        }
    }

    /// Disables decision logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    /// Sets decision logging explicitly.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Admin-tier decision. Pure; does not read the store.
    pub fn admin_decision(&self, principal: PrincipalId, roles: &RoleSet) -> Decision {
        let decision = if roles.intersects(&ADMIN_ROLES) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::NotAdmin)
        };

        if self.audit_enabled {
            if decision.is_allowed() {
                info!(principal = %principal, roles = %roles, "Admin access granted");
            } else {
                warn!(principal = %principal, roles = %roles, "Admin access denied");
            }
        }

        decision
    }

    /// Permission decision.
    ///
    /// Store failures are returned as [`AccessError::Internal`], never as a
    /// denial.
    pub fn permission_decision(
        &self,
        principal: PrincipalId,
        roles: &RoleSet,
        permission: &PermissionName,
    ) -> Result<Decision> {
        let allowed = roles.is_super_admin()
            || self
                .permissions
                .has_permission(principal, roles, permission)?;

        if self.audit_enabled {
            if allowed {
                info!(
                    principal = %principal,
                    roles = %roles,
                    permission = %permission,
                    "Permission granted"
                );
            } else {
                warn!(
                    principal = %principal,
                    roles = %roles,
                    permission = %permission,
                    "Permission denied"
                );
            }
        }

        Ok(if allowed {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::MissingPermission(permission.clone()))
        })
    }

    /// Admin decision as a `Result`.
    pub fn enforce_admin(&self, principal: PrincipalId, roles: &RoleSet) -> Result<()> {
        self.admin_decision(principal, roles).into_result()
    }

    /// Permission decision as a `Result`.
    pub fn enforce_permission(
        &self,
        principal: PrincipalId,
        roles: &RoleSet,
        permission: &PermissionName,
    ) -> Result<()> {
        self.permission_decision(principal, roles, permission)?
            .into_result()
    }
}
