//! # portcullis-types: Core data model for `Portcullis`
//!
//! This crate contains the types shared by every layer of the authorization
//! core:
//! - Entity IDs ([`PrincipalId`], [`RoleId`], [`PermissionId`])
//! - Relations ([`Role`], [`Permission`], [`RolePermission`], [`UserRole`])
//! - The external identity ([`Principal`])
//! - Validated permission names ([`PermissionName`])
//! - Resolved role membership ([`RoleSet`])
//! - Distinguished role names ([`SUPER_ADMIN_ROLE`], [`ADMIN_ROLES`])

use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};

mod permission_name;

pub use permission_name::{PermissionName, PermissionNameError};

// ============================================================================
// Distinguished role names
// ============================================================================

/// Role that passes every permission check unconditionally.
///
/// Holders of this role need no explicit grants.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Roles that open the admin tier.
///
/// This list is closed: holding any other role never satisfies an admin
/// decision, whatever permissions that role has been granted.
pub const ADMIN_ROLES: [&str; 3] = [SUPER_ADMIN_ROLE, "editor", "content_manager"];

// ============================================================================
// Entity IDs - All Copy (cheap 8-byte values)
// ============================================================================

/// Identifier of an authenticated principal.
///
/// Issued by the session subsystem; this crate only references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(u64);

impl PrincipalId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PrincipalId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for u64 {
    fn from(id: PrincipalId) -> Self {
        id.0
    }
}

/// Identifier of a provisioned role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(u64);

impl RoleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RoleId> for u64 {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

/// Identifier of a provisioned permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(u64);

impl PermissionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PermissionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PermissionId> for u64 {
    fn from(id: PermissionId) -> Self {
        id.0
    }
}

// ============================================================================
// Relations
// ============================================================================

/// Authenticated identity owned by the session subsystem.
///
/// Referenced by authorization decisions but never mutated by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub name: String,
}

impl Principal {
    pub fn new(id: PrincipalId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A named bundle of permissions assignable to principals.
///
/// Names are globally unique. The identity of a role is fixed once any
/// grant or assignment references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
}

impl Role {
    /// Returns whether this is the superuser role.
    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN_ROLE
    }

    /// Returns whether holding this role opens the admin tier.
    pub fn is_admin_tier(&self) -> bool {
        ADMIN_ROLES.contains(&self.name.as_str())
    }
}

/// An atomic `resource.action` capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    /// Sole lookup key used by decisions.
    pub name: PermissionName,
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl Permission {
    /// Builds a permission whose `resource` and `action` are derived from
    /// the validated name.
    pub fn new(id: PermissionId, name: PermissionName, description: impl Into<String>) -> Self {
        Self {
            id,
            resource: name.resource().to_string(),
            action: name.action().to_string(),
            name,
            description: description.into(),
        }
    }
}

/// Grant: a role-to-permission association.
///
/// The pair is the identity; a grant has no other attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
}

/// Assignment: a principal-to-role association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserRole {
    pub principal_id: PrincipalId,
    pub role_id: RoleId,
}

// ============================================================================
// Resolved role membership
// ============================================================================

/// Deduplicated, ordered set of role names held by a principal.
///
/// Produced once per guarded call and handed to every decision made within
/// it, so no decision re-reads role membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    names: BTreeSet<String>,
}

impl RoleSet {
    /// Creates an empty role set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether the set contains the given role name.
    pub fn contains(&self, role: &str) -> bool {
        self.names.contains(role)
    }

    /// Returns whether any role in this set appears in `roles`.
    pub fn intersects(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.names.contains(*role))
    }

    /// Returns whether the superuser role is held.
    pub fn is_super_admin(&self) -> bool {
        self.contains(SUPER_ADMIN_ROLE)
    }

    /// Returns whether any admin-tier role is held.
    pub fn is_admin_tier(&self) -> bool {
        self.intersects(&ADMIN_ROLES)
    }

    /// Adds a role name. Returns `false` if it was already present.
    pub fn insert(&mut self, role: impl Into<String>) -> bool {
        self.names.insert(role.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates role names in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "]")
    }
}
