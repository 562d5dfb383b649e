//! Permission resolution.
//!
//! A principal has a permission when **any** of its roles is granted it
//! (union semantics). The superuser role short-circuits before the store is
//! consulted.

use portcullis_store::{AccessStore, StoreResult};
use portcullis_types::{PermissionName, PrincipalId, RoleSet};
use tracing::trace;

/// Answers whether a principal's roles grant a specific permission.
#[derive(Debug)]
pub struct PermissionResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: AccessStore + ?Sized> PermissionResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns whether `principal` holds `permission`.
    ///
    /// 1. `super_admin` in `roles` → `true`, no store access.
    /// 2. Otherwise one exists-query joining assignments, roles, grants and
    ///    permissions for this principal and this exact name.
    ///
    /// `roles` is only consulted for the bypass; grants are always read
    /// from the store so a revocation is visible immediately.
    pub fn has_permission(
        &self,
        principal: PrincipalId,
        roles: &RoleSet,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        if roles.is_super_admin() {
            trace!(principal = %principal, permission = %permission, "Superuser bypass");
            return Ok(true);
        }

        let granted = self.store.principal_has_permission(principal, permission)?;
        trace!(principal = %principal, permission = %permission, granted, "Permission resolved");
        Ok(granted)
    }
}
