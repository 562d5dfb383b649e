//! portcullis-store: Relational store contract for `Portcullis`
//!
//! The authorization core reads four relations: `Role`, `Permission`,
//! `RolePermission` (grants) and `UserRole` (assignments). This crate
//! defines the read contract over them ([`AccessStore`]) and ships:
//!
//! - [`MemoryStore`]: an in-process implementation with provisioning
//!   writes, suitable for tests, fixtures and single-node deployments
//! - [`Seed`]: TOML provisioning fixtures loaded into a [`MemoryStore`]
//! - [`CountingStore`]: a wrapper that counts every query, for verifying
//!   which paths touch the store
//!
//! # Example
//!
//! ```
//! use portcullis_store::{AccessStore, MemoryStore};
//! use portcullis_types::{PermissionName, PrincipalId};
//!
//! let store = MemoryStore::new();
//! let editor = store.create_role("editor", "Edits content")?;
//! let create = store.create_permission(PermissionName::new("cms.pages.create")?, "")?;
//! store.grant(editor.id, create.id)?;
//! store.assign(PrincipalId::new(1), editor.id)?;
//!
//! assert_eq!(store.role_names_of(PrincipalId::new(1))?, vec!["editor".to_string()]);
//! assert!(store.principal_has_permission(PrincipalId::new(1), &create.name)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Consistency
//!
//! Every query reads current state. Nothing is cached, so a revoked
//! assignment is invisible to the very next query. Concurrent writes may
//! be observed either before or after they land; no snapshot spans more
//! than one query.

use std::sync::Arc;

use portcullis_types::{Permission, PermissionName, PrincipalId, Role};

mod counting;
mod error;
mod memory;
mod seed;


pub use counting::{CountingStore, QueryCounts};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use seed::{Seed, SeedAssignment, SeedPermission, SeedRole};

/// Read access to the role and permission relations.
///
/// Implementations must not cache across calls: each call reflects the
/// store as it is when the call runs. Failures surface as [`StoreError`]
/// and are never turned into an empty answer.
pub trait AccessStore: Send + Sync {
    /// Names of the roles assigned to `principal` (`UserRole` joined to
    /// `Role`). Empty when the principal holds no roles.
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>>;

    /// Whether any role assigned to `principal` has been granted exactly
    /// `permission`.
    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool>;

    /// All provisioned roles, ordered by id.
    fn list_roles(&self) -> StoreResult<Vec<Role>>;

    /// Union of the permissions granted to every role `principal` holds,
    /// deduplicated and ordered by name.
    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>>;
}

impl<T: AccessStore + ?Sized> AccessStore for &T {
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>> {
        (**self).role_names_of(principal)
    }

    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        (**self).principal_has_permission(principal, permission)
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        (**self).list_roles()
    }

    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>> {
        (**self).permissions_of(principal)
    }
}

impl<T: AccessStore + ?Sized> AccessStore for Arc<T> {
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>> {
        (**self).role_names_of(principal)
    }

    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        (**self).principal_has_permission(principal, permission)
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        (**self).list_roles()
    }

    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>> {
        (**self).permissions_of(principal)
    }
}

impl<T: AccessStore + ?Sized> AccessStore for Box<T> {
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>> {
        (**self).role_names_of(principal)
    }

    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        (**self).principal_has_permission(principal, permission)
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        (**self).list_roles()
    }

    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>> {
        (**self).permissions_of(principal)
    }
}
