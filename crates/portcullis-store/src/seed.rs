//! TOML provisioning fixtures.
//!
//! ```toml
//! [[permissions]]
//! name = "cms.pages.create"
//! description = "Create CMS pages"
//!
//! [[roles]]
//! name = "editor"
//! description = "Edits storefront content"
//! permissions = ["cms.pages.create"]
//!
//! [[assignments]]
//! principal = 42
//! roles = ["editor"]
//! ```

use std::fs;
use std::path::Path;

use portcullis_types::{PermissionName, PrincipalId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{MemoryStore, StoreError, StoreResult};

/// A permission row to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPermission {
    pub name: PermissionName,
    #[serde(default)]
    pub description: String,
}

/// A role row to provision, with the permissions it is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRole {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<PermissionName>,
}

/// Roles to assign to one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub principal: PrincipalId,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A complete provisioning fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub permissions: Vec<SeedPermission>,
    pub roles: Vec<SeedRole>,
    pub assignments: Vec<SeedAssignment>,
}

impl Seed {
    /// Parses a fixture from TOML text.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Seed(e.to_string()))
    }

    /// Reads and parses a fixture file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StoreError::SeedRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Provisions every row of this fixture into `store`.
    ///
    /// Permissions are created first, then roles with their grants, then
    /// assignments. A role may only reference permissions declared in the
    /// same fixture or already present in the store; an assignment may only
    /// reference known roles. Repeated grants or assignments are ignored.
    ///
    /// All or nothing: on any error the store is left exactly as it was.
    pub fn apply(&self, store: &MemoryStore) -> StoreResult<()> {
        store.atomically(|tables| {
            for permission in &self.permissions {
                tables
                    .create_permission(permission.name.clone(), permission.description.clone())?;
            }

            for seed_role in &self.roles {
                let role =
                    tables.create_role(seed_role.name.clone(), seed_role.description.clone())?;
                for name in &seed_role.permissions {
                    let permission = tables.permission_id(name).ok_or_else(|| {
                        StoreError::Seed(format!(
                            "role '{}' references undeclared permission '{name}'",
                            seed_role.name
                        ))
                    })?;
                    tables.grant(role.id, permission)?;
                }
            }

            for assignment in &self.assignments {
                for name in &assignment.roles {
                    let role = tables.role_id(name).ok_or_else(|| {
                        StoreError::Seed(format!(
                            "assignment for principal {} references undeclared role '{name}'",
                            assignment.principal
                        ))
                    })?;
                    tables.assign(assignment.principal, role)?;
                }
            }
            Ok(())
        })?;

        info!(
            permissions = self.permissions.len(),
            roles = self.roles.len(),
            assignments = self.assignments.len(),
            "Seed applied"
        );
        Ok(())
    }
}

impl MemoryStore {
    /// Builds a store provisioned from `seed`.
    pub fn from_seed(seed: &Seed) -> StoreResult<Self> {
        let store = Self::new();
        seed.apply(&store)?;
        Ok(store)
    }
}
