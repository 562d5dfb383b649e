//! In-memory relational store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use portcullis_types::{
    Permission, PermissionId, PermissionName, PrincipalId, Role, RoleId, RolePermission, UserRole,
};
use tracing::debug;

use crate::{AccessStore, StoreError, StoreResult};

/// The four relations plus the unique-name indexes over them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    next_role_id: u64,
    next_permission_id: u64,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    role_names: HashMap<String, RoleId>,
    permission_names: HashMap<PermissionName, PermissionId>,
    /// Composite key (role, permission); a set, so a grant exists at most once.
    grants: BTreeSet<RolePermission>,
    /// Composite key (principal, role); ordered by principal first.
    assignments: BTreeSet<UserRole>,
}

impl Tables {
    fn roles_held_by(&self, principal: PrincipalId) -> impl Iterator<Item = RoleId> + '_ {
        let start = UserRole {
            principal_id: principal,
            role_id: RoleId::new(0),
        };
        let end = UserRole {
            principal_id: principal,
            role_id: RoleId::new(u64::MAX),
        };
        self.assignments.range(start..=end).map(|a| a.role_id)
    }

    fn require_role(&self, role: RoleId) -> StoreResult<&Role> {
        self.roles
            .get(&role)
            .ok_or_else(|| StoreError::not_found("role", role))
    }

    fn require_permission(&self, permission: PermissionId) -> StoreResult<&Permission> {
        self.permissions
            .get(&permission)
            .ok_or_else(|| StoreError::not_found("permission", permission))
    }

    pub(crate) fn role_id(&self, name: &str) -> Option<RoleId> {
        self.role_names.get(name).copied()
    }

    pub(crate) fn permission_id(&self, name: &PermissionName) -> Option<PermissionId> {
        self.permission_names.get(name).copied()
    }

    pub(crate) fn create_role(&mut self, name: String, description: String) -> StoreResult<Role> {
        if name.is_empty() || name.trim() != name {
            return Err(StoreError::InvalidRoleName(name));
        }
        if self.role_names.contains_key(&name) {
            return Err(StoreError::duplicate("role", name));
        }

        self.next_role_id += 1;
        let role = Role {
            id: RoleId::new(self.next_role_id),
            name,
            description,
        };
        self.role_names.insert(role.name.clone(), role.id);
        self.roles.insert(role.id, role.clone());
        Ok(role)
    }

    pub(crate) fn create_permission(
        &mut self,
        name: PermissionName,
        description: String,
    ) -> StoreResult<Permission> {
        if self.permission_names.contains_key(&name) {
            return Err(StoreError::duplicate("permission", name));
        }

        self.next_permission_id += 1;
        let permission = Permission::new(
            PermissionId::new(self.next_permission_id),
            name,
            description,
        );
        self.permission_names
            .insert(permission.name.clone(), permission.id);
        self.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    pub(crate) fn grant(&mut self, role: RoleId, permission: PermissionId) -> StoreResult<bool> {
        self.require_role(role)?;
        self.require_permission(permission)?;
        Ok(self.grants.insert(RolePermission {
            role_id: role,
            permission_id: permission,
        }))
    }

    pub(crate) fn assign(&mut self, principal: PrincipalId, role: RoleId) -> StoreResult<bool> {
        self.require_role(role)?;
        Ok(self.assignments.insert(UserRole {
            principal_id: principal,
            role_id: role,
        }))
    }
}

/// Thread-safe in-memory implementation of [`AccessStore`].
///
/// Besides the read contract it exposes the provisioning writes an
/// administrator would run: creating roles and permissions, granting,
/// assigning and revoking. Writes take a short exclusive lock; reads take a
/// shared lock for the duration of a single query only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Runs a batch of writes against a copy of the tables and publishes the
    /// copy only if the whole batch succeeds.
    ///
    /// The write lock is held throughout, so readers see either none or all
    /// of the batch.
    pub(crate) fn atomically<T>(
        &self,
        batch: impl FnOnce(&mut Tables) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut tables = self.write()?;
        let mut scratch = tables.clone();
        let out = batch(&mut scratch)?;
        *tables = scratch;
        Ok(out)
    }

    // ------------------------------------------------------------------------
    // Provisioning
    // ------------------------------------------------------------------------

    /// Creates a role. Names are unique and must be non-empty without
    /// surrounding whitespace.
    pub fn create_role(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> StoreResult<Role> {
        let role = self.write()?.create_role(name.into(), description.into())?;
        debug!(role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Creates a permission. Names are unique.
    pub fn create_permission(
        &self,
        name: PermissionName,
        description: impl Into<String>,
    ) -> StoreResult<Permission> {
        let permission = self.write()?.create_permission(name, description.into())?;
        debug!(
            permission_id = %permission.id,
            permission = %permission.name,
            "Permission created"
        );
        Ok(permission)
    }

    /// Grants a permission to a role.
    ///
    /// Returns `false` if the grant already existed.
    pub fn grant(&self, role: RoleId, permission: PermissionId) -> StoreResult<bool> {
        let inserted = self.write()?.grant(role, permission)?;
        debug!(role_id = %role, permission_id = %permission, inserted, "Grant");
        Ok(inserted)
    }

    /// Removes a grant. Returns `false` if there was nothing to remove.
    pub fn revoke_grant(&self, role: RoleId, permission: PermissionId) -> StoreResult<bool> {
        let mut tables = self.write()?;
        let removed = tables.grants.remove(&RolePermission {
            role_id: role,
            permission_id: permission,
        });
        debug!(role_id = %role, permission_id = %permission, removed, "Grant revoked");
        Ok(removed)
    }

    /// Assigns a role to a principal.
    ///
    /// Returns `false` if the principal already held the role; the
    /// assignment is not recorded twice.
    pub fn assign(&self, principal: PrincipalId, role: RoleId) -> StoreResult<bool> {
        let inserted = self.write()?.assign(principal, role)?;
        debug!(principal = %principal, role_id = %role, inserted, "Role assigned");
        Ok(inserted)
    }

    /// Removes a role from a principal. Returns `false` if it was not held.
    pub fn unassign(&self, principal: PrincipalId, role: RoleId) -> StoreResult<bool> {
        let mut tables = self.write()?;
        let removed = tables.assignments.remove(&UserRole {
            principal_id: principal,
            role_id: role,
        });
        debug!(principal = %principal, role_id = %role, removed, "Role unassigned");
        Ok(removed)
    }

    /// Deletes a role together with its grants and assignments.
    pub fn delete_role(&self, role: RoleId) -> StoreResult<Role> {
        let mut tables = self.write()?;
        let removed = tables
            .roles
            .remove(&role)
            .ok_or_else(|| StoreError::not_found("role", role))?;

        tables.role_names.remove(&removed.name);
        tables.grants.retain(|g| g.role_id != role);
        tables.assignments.retain(|a| a.role_id != role);

        debug!(role_id = %role, role = %removed.name, "Role deleted");
        Ok(removed)
    }

    /// Deletes a permission together with every grant of it.
    pub fn delete_permission(&self, permission: PermissionId) -> StoreResult<Permission> {
        let mut tables = self.write()?;
        let removed = tables
            .permissions
            .remove(&permission)
            .ok_or_else(|| StoreError::not_found("permission", permission))?;

        tables.permission_names.remove(&removed.name);
        tables.grants.retain(|g| g.permission_id != permission);

        debug!(permission_id = %permission, permission = %removed.name, "Permission deleted");
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub fn role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let tables = self.read()?;
        Ok(tables
            .role_names
            .get(name)
            .and_then(|id| tables.roles.get(id))
            .cloned())
    }

    pub fn permission_by_name(&self, name: &PermissionName) -> StoreResult<Option<Permission>> {
        let tables = self.read()?;
        Ok(tables
            .permission_names
            .get(name)
            .and_then(|id| tables.permissions.get(id))
            .cloned())
    }

    /// Every assignment row, ordered by principal then role.
    pub fn assignments(&self) -> StoreResult<Vec<UserRole>> {
        Ok(self.read()?.assignments.iter().copied().collect())
    }

    /// Every grant row, ordered by role then permission.
    pub fn grants(&self) -> StoreResult<Vec<RolePermission>> {
        Ok(self.read()?.grants.iter().copied().collect())
    }
}

impl AccessStore for MemoryStore {
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>> {
        let tables = self.read()?;
        let names = tables
            .roles_held_by(principal)
            .filter_map(|id| tables.roles.get(&id))
            .map(|role| role.name.clone())
            .collect();
        Ok(names)
    }

    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        let tables = self.read()?;
        let Some(&permission_id) = tables.permission_names.get(permission) else {
            return Ok(false);
        };

        let granted = tables.roles_held_by(principal).any(|role_id| {
            tables.grants.contains(&RolePermission {
                role_id,
                permission_id,
            })
        });
        Ok(granted)
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>> {
        let tables = self.read()?;
        let held: BTreeSet<RoleId> = tables.roles_held_by(principal).collect();

        let mut by_name: BTreeMap<&PermissionName, &Permission> = BTreeMap::new();
        for grant in tables.grants.iter().filter(|g| held.contains(&g.role_id)) {
            if let Some(permission) = tables.permissions.get(&grant.permission_id) {
                by_name.insert(&permission.name, permission);
            }
        }

        Ok(by_name.into_values().cloned().collect())
    }
}
