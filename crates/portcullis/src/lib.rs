//! # Portcullis
//!
//! Role-based access control for the admin surfaces of a storefront or CMS.
//!
//! Principals hold roles; roles are granted named permissions
//! (`resource.action`, e.g. `products.delete`). Requests are guarded in
//! three steps, each of which can stop the call:
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────┐   ┌────────┐
//! │   Session    │ → │ Roles (once)  │ → │ Admin tier?  │ → │ Perm?  │ → action
//! │ (401 if none)│   │  from store   │   │ (403 if not) │   │ (403)  │
//! └──────────────┘   └───────────────┘   └──────────────┘   └────────┘
//! ```
//!
//! - `super_admin` passes every permission check without any grants.
//! - The admin tier is exactly `super_admin`, `editor` and `content_manager`.
//! - A principal's permissions are the union over all their roles.
//! - Store or session failures surface as internal errors, never as denials.
//!
//! # Quick Start
//!
//! ```no_run
//! use portcullis::{Portcullis, PortcullisConfig, PermissionName, StaticSessions};
//!
//! let config = PortcullisConfig::load()?;
//! portcullis::telemetry::init_from_config(&config);
//!
//! let service = Portcullis::from_config(&config, StaticSessions::new())?;
//!
//! let delete = PermissionName::new("products.delete")?;
//! service.require_permission("bearer-token", &delete, |ctx| {
//!     println!("{} may delete products", ctx.principal.email);
//!     Ok::<_, portcullis::AccessError>(())
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Crates
//!
//! - [`portcullis_types`]: ids, entities, [`PermissionName`], [`RoleSet`]
//! - [`portcullis_store`]: the [`AccessStore`] contract and [`MemoryStore`]
//! - [`portcullis_rbac`]: decisions, [`Guard`], sessions, queries
//! - [`portcullis_config`]: layered TOML/env configuration

mod service;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use service::Portcullis;

pub use portcullis_config::{ConfigLoader, PortcullisConfig, RoleListing};
pub use portcullis_rbac::{
    AccessContext, AccessDecisionEngine, AccessError, AccessSummary, Decision, DenyReason, Guard,
    GuardState, InternalError, Requirement, RoleSummary, SessionError, SessionResolver,
    StaticSessions,
};
pub use portcullis_store::{
    AccessStore, CountingStore, MemoryStore, QueryCounts, Seed, StoreError, StoreResult,
};
pub use portcullis_types::{
    ADMIN_ROLES, Permission, PermissionId, PermissionName, PermissionNameError, Principal,
    PrincipalId, Role, RoleId, RoleSet, SUPER_ADMIN_ROLE,
};

// Crates re-exported for callers that need their less common items.
pub use portcullis_config;
pub use portcullis_rbac;
pub use portcullis_store;
pub use portcullis_types;
