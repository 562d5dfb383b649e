//! Read-only query surface for UI and client gating.
//!
//! These functions answer questions; they do not authorize anything on
//! their own. Callers put them behind a [`Guard`](crate::Guard) as needed.

use portcullis_store::AccessStore;
use portcullis_types::{PrincipalId, Role, RoleId, RoleSet};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::roles::RoleResolver;

/// What a client needs to decide which screens to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    pub is_admin: bool,
    pub roles: Vec<String>,
}

impl From<&RoleSet> for AccessSummary {
    fn from(roles: &RoleSet) -> Self {
        Self {
            is_admin: roles.is_admin_tier(),
            roles: roles.to_vec(),
        }
    }
}

/// Public view of a provisioned role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: RoleId,
    pub name: String,
    pub description: String,
}

impl From<Role> for RoleSummary {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
        }
    }
}

/// Resolves `principal`'s roles and whether they open the admin tier.
///
/// A principal with no assignments gets `{ is_admin: false, roles: [] }`.
pub fn check_access<S: AccessStore + ?Sized>(
    store: &S,
    principal: PrincipalId,
) -> Result<AccessSummary> {
    let roles = RoleResolver::new(store).roles_of(principal)?;
    Ok(AccessSummary::from(&roles))
}

/// Enumerates every provisioned role, ordered by id.
pub fn list_roles<S: AccessStore + ?Sized>(store: &S) -> Result<Vec<RoleSummary>> {
    Ok(store
        .list_roles()?
        .into_iter()
        .map(RoleSummary::from)
        .collect())
}

/// Names of the permissions explicitly granted to `principal` through any
/// role, sorted.
///
/// Reflects grants only. A `super_admin` passes every check regardless of
/// what this returns.
pub fn effective_permissions<S: AccessStore + ?Sized>(
    store: &S,
    principal: PrincipalId,
) -> Result<Vec<String>> {
    Ok(store
        .permissions_of(principal)?
        .into_iter()
        .map(|permission| permission.name.into())
        .collect())
}
