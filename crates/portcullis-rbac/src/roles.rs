//! Role resolution.
//!
//! Loads the role names a principal holds. Pure read: one store query per
//! call, no side effects, no caching.

use portcullis_store::{AccessStore, StoreResult};
use portcullis_types::{PrincipalId, RoleSet};
use tracing::debug;

/// Resolves the [`RoleSet`] of a principal from the store.
#[derive(Debug)]
pub struct RoleResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: AccessStore + ?Sized> RoleResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the deduplicated role names held by `principal`.
    ///
    /// An unknown principal and a principal without assignments both yield
    /// an empty set. Store failures propagate unchanged.
    pub fn roles_of(&self, principal: PrincipalId) -> StoreResult<RoleSet> {
        let roles: RoleSet = self.store.role_names_of(principal)?.into_iter().collect();
        debug!(principal = %principal, roles = %roles, "Roles resolved");
        Ok(roles)
    }
}
