//! Query-counting store wrapper.

use std::sync::atomic::{AtomicU64, Ordering};

use portcullis_types::{Permission, PermissionName, PrincipalId, Role};

use crate::{AccessStore, StoreResult};

/// Snapshot of the counters held by a [`CountingStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounts {
    pub role_lookups: u64,
    pub permission_checks: u64,
    pub role_listings: u64,
    pub permission_listings: u64,
}

impl QueryCounts {
    pub fn total(&self) -> u64 {
        self.role_lookups + self.permission_checks + self.role_listings + self.permission_listings
    }
}

/// Wraps a store and counts every query issued through it.
///
/// Counts are incremented before delegating, so failed queries are counted
/// too.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    role_lookups: AtomicU64,
    permission_checks: AtomicU64,
    role_listings: AtomicU64,
    permission_listings: AtomicU64,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            role_lookups: AtomicU64::new(0),
            permission_checks: AtomicU64::new(0),
            role_listings: AtomicU64::new(0),
            permission_listings: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn counts(&self) -> QueryCounts {
        QueryCounts {
            role_lookups: self.role_lookups.load(Ordering::Relaxed),
            permission_checks: self.permission_checks.load(Ordering::Relaxed),
            role_listings: self.role_listings.load(Ordering::Relaxed),
            permission_listings: self.permission_listings.load(Ordering::Relaxed),
        }
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        self.role_lookups.store(0, Ordering::Relaxed);
        self.permission_checks.store(0, Ordering::Relaxed);
        self.role_listings.store(0, Ordering::Relaxed);
        self.permission_listings.store(0, Ordering::Relaxed);
    }
}

impl<S: AccessStore> AccessStore for CountingStore<S> {
    fn role_names_of(&self, principal: PrincipalId) -> StoreResult<Vec<String>> {
        self.role_lookups.fetch_add(1, Ordering::Relaxed);
        self.inner.role_names_of(principal)
    }

    fn principal_has_permission(
        &self,
        principal: PrincipalId,
        permission: &PermissionName,
    ) -> StoreResult<bool> {
        self.permission_checks.fetch_add(1, Ordering::Relaxed);
        self.inner.principal_has_permission(principal, permission)
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.role_listings.fetch_add(1, Ordering::Relaxed);
        self.inner.list_roles()
    }

    fn permissions_of(&self, principal: PrincipalId) -> StoreResult<Vec<Permission>> {
        self.permission_listings.fetch_add(1, Ordering::Relaxed);
        self.inner.permissions_of(principal)
    }
}
