//! # portcullis-rbac: Role-Based Access Control
//!
//! Decides whether an authenticated principal may perform an action.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Credentials                                 │
//! └─────────────────┬───────────────────────────┘
//!                   │ SessionResolver
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Principal                                   │
//! └─────────────────┬───────────────────────────┘
//!                   │ RoleResolver (once per call)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  AccessDecisionEngine                        │
//! │  ├─ Admin decision (admin role set)          │
//! │  └─ Permission decision (grants, bypass)     │
//! └─────────────────┬───────────────────────────┘
//!                   │ Allow
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Action(AccessContext)                       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Effective permissions are the **union** over all held roles.
//! - `super_admin` passes every permission decision, grants or not.
//! - The admin tier is exactly `super_admin`, `editor`, `content_manager`.
//! - Every decision re-reads grants; a revocation takes effect on the next
//!   call.
//!
//! ## Errors
//!
//! | Error                          | Meaning                  | Caller response      |
//! |--------------------------------|--------------------------|----------------------|
//! | `Unauthenticated`              | no session               | redirect to sign-in  |
//! | `ForbiddenNotAdmin`            | no admin-tier role       | access-denied page   |
//! | `ForbiddenMissingPermission`   | no granting role         | access-denied page   |
//! | `Internal`                     | store/session failure    | error page, alert    |
//!
//! ## Example
//!
//! ```
//! use portcullis_rbac::{AccessError, Guard, StaticSessions};
//! use portcullis_store::MemoryStore;
//! use portcullis_types::{PermissionName, Principal, PrincipalId};
//!
//! let store = MemoryStore::new();
//! let editor = store.create_role("editor", "Edits content")?;
//! let create = store.create_permission(PermissionName::new("cms.pages.create")?, "")?;
//! store.grant(editor.id, create.id)?;
//! store.assign(PrincipalId::new(7), editor.id)?;
//!
//! let sessions = StaticSessions::new()
//!     .with_session("tok", Principal::new(PrincipalId::new(7), "e@example.com", "Ed"));
//!
//! // Allowed: editor is admin-tier and holds the grant.
//! Guard::permission(create.name.clone())
//!     .run(&sessions, &store, "tok", |_ctx| Ok::<_, AccessError>(()))?;
//!
//! // Denied: no grant for products.delete.
//! let err = Guard::permission(PermissionName::new("products.delete")?)
//!     .run(&sessions, &store, "tok", |_ctx| Ok::<_, AccessError>(()))
//!     .unwrap_err();
//! assert!(err.is_forbidden());
//!
//! // No session at all.
//! let err = Guard::admin()
//!     .run(&sessions, &store, "", |_ctx| Ok::<_, AccessError>(()))
//!     .unwrap_err();
//! assert!(err.requires_login());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod enforcement;
pub mod error;
pub mod guard;
pub mod permissions;
pub mod query;
pub mod roles;
pub mod session;

#[cfg(test)]
mod tests;

pub use enforcement::{AccessDecisionEngine, Decision, DenyReason};
pub use error::{AccessError, InternalError, Result, SessionError};
pub use guard::{AccessContext, Guard, GuardState, Requirement};
pub use permissions::PermissionResolver;
pub use query::{AccessSummary, RoleSummary, check_access, effective_permissions, list_roles};
pub use roles::RoleResolver;
pub use session::{SessionResolver, StaticSessions};
