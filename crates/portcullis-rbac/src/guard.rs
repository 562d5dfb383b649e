//! Guard composition.
//!
//! A [`Guard`] is an ordered list of [`Requirement`]s evaluated on top of
//! an authenticated session:
//!
//! ```text
//! credentials ──► SessionResolver ──► RoleResolver ──► requirements ──► action
//!                      │ none              (once)          │ deny
//!                      ▼                                    ▼
//!               Unauthenticated                      Decided(Deny)
//! ```
//!
//! Each step short-circuits. With no session the store is never queried;
//! on the first denying requirement the rest are skipped and the action
//! does not run. Guards hold no state between invocations.

use portcullis_store::AccessStore;
use portcullis_types::{PermissionName, Principal, PrincipalId, RoleSet};
use tracing::debug;

use crate::enforcement::{AccessDecisionEngine, Decision};
use crate::error::{AccessError, Result};
use crate::roles::RoleResolver;
use crate::session::SessionResolver;

/// One check applied after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Hold an admin-tier role.
    Admin,
    /// Hold the named permission through any role, or be `super_admin`.
    Permission(PermissionName),
}

/// Where a guarded call stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// No session; terminal.
    Unauthenticated,
    /// Session and roles resolved, requirements not yet decided.
    AuthenticatedPending,
    /// Every requirement allowed, or the first one to deny.
    Decided(Decision),
}

/// What a permitted action receives.
///
/// The role set was resolved once for the whole guarded call; decisions
/// made inside the action should reuse it rather than re-resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub principal: Principal,
    pub roles: RoleSet,
}

impl AccessContext {
    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    /// Whether an admin-tier role is held.
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin_tier()
    }

    /// Applies a further permission decision using the already-resolved
    /// roles.
    pub fn require_permission<S: AccessStore + ?Sized>(
        &self,
        store: &S,
        permission: &PermissionName,
    ) -> Result<()> {
        AccessDecisionEngine::new(store).enforce_permission(
            self.principal.id,
            &self.roles,
            permission,
        )
    }
}

/// Authenticated-only guard, optionally narrowed by admin and permission
/// requirements.
///
/// # Examples
///
/// ```
/// use portcullis_rbac::{Guard, StaticSessions};
/// use portcullis_store::MemoryStore;
/// use portcullis_types::{PermissionName, Principal, PrincipalId};
///
/// let store = MemoryStore::new();
/// let admin = store.create_role("super_admin", "")?;
/// store.assign(PrincipalId::new(1), admin.id)?;
///
/// let sessions = StaticSessions::new()
///     .with_session("tok", Principal::new(PrincipalId::new(1), "a@example.com", "A"));
///
/// let guard = Guard::permission(PermissionName::new("products.delete")?);
/// let deleted = guard.run(&sessions, &store, "tok", |ctx| {
///     Ok::<_, portcullis_rbac::AccessError>(ctx.principal_id())
/// })?;
/// assert_eq!(deleted, PrincipalId::new(1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Guard {
    requirements: Vec<Requirement>,
    audit_enabled: bool,
}

impl Default for Guard {
    fn default() -> Self {
        Self::authenticated()
    }
}

impl Guard {
    /// Requires a session and nothing else.
    pub fn authenticated() -> Self {
        Self {
            requirements: Vec::new(),
            audit_enabled: true,
        }
    }

    /// Requires a session and an admin-tier role.
    pub fn admin() -> Self {
        Self::authenticated().require_admin()
    }

    /// Requires a session, an admin-tier role and `permission`: the usual
    /// gate for permission-protected admin actions.
    pub fn permission(permission: PermissionName) -> Self {
        Self::admin().require_permission(permission)
    }

    /// Appends an admin requirement.
    pub fn require_admin(mut self) -> Self {
        self.requirements.push(Requirement::Admin);
        self
    }

    /// Appends a permission requirement.
    pub fn require_permission(mut self, permission: PermissionName) -> Self {
        self.requirements.push(Requirement::Permission(permission));
        self
    }

    /// Disables decision logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Runs the guard up to, but not including, the action.
    ///
    /// Returns the context an action would receive.
    pub fn evaluate<S, R>(
        &self,
        sessions: &R,
        store: &S,
        credentials: &R::Credentials,
    ) -> Result<AccessContext>
    where
        S: AccessStore + ?Sized,
        R: SessionResolver + ?Sized,
    {
        let Some(principal) = sessions.get_session(credentials)? else {
            debug!(state = ?GuardState::Unauthenticated, "Guard stopped");
            return Err(AccessError::Unauthenticated);
        };

        let roles = RoleResolver::new(store).roles_of(principal.id)?;
        let context = AccessContext { principal, roles };
        debug!(
            state = ?GuardState::AuthenticatedPending,
            principal = %context.principal.id,
            requirements = self.requirements.len(),
            "Guard authenticated"
        );

        let decision = self.decide(store, &context)?;
        debug!(
            state = ?GuardState::Decided(decision.clone()),
            principal = %context.principal.id,
            "Guard decided"
        );

        decision.into_result()?;
        Ok(context)
    }

    /// Runs the guard and, if every requirement allows, the action.
    ///
    /// The action's error type only has to absorb [`AccessError`].
    pub fn run<S, R, F, T, E>(
        &self,
        sessions: &R,
        store: &S,
        credentials: &R::Credentials,
        action: F,
    ) -> std::result::Result<T, E>
    where
        S: AccessStore + ?Sized,
        R: SessionResolver + ?Sized,
        F: FnOnce(AccessContext) -> std::result::Result<T, E>,
        E: From<AccessError>,
    {
        let context = self.evaluate(sessions, store, credentials)?;
        action(context)
    }

    /// First denying decision, or `Allow` when all requirements pass.
    fn decide<S: AccessStore + ?Sized>(
        &self,
        store: &S,
        context: &AccessContext,
    ) -> Result<Decision> {
        let engine = AccessDecisionEngine::new(store).with_audit(self.audit_enabled);
        let principal = context.principal.id;

        for requirement in &self.requirements {
            let decision = match requirement {
                Requirement::Admin => engine.admin_decision(principal, &context.roles),
                Requirement::Permission(permission) => {
                    engine.permission_decision(principal, &context.roles, permission)?
                }
            };
            if !decision.is_allowed() {
                return Ok(decision);
            }
        }

        Ok(Decision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSessions;
    use portcullis_store::{CountingStore, MemoryStore};

    fn perm(name: &str) -> PermissionName {
        PermissionName::new(name).unwrap()
    }

    #[test]
    fn constructors_compose_requirements() {
        assert!(Guard::authenticated().requirements().is_empty());
        assert_eq!(Guard::admin().requirements(), &[Requirement::Admin]);
        assert_eq!(
            Guard::permission(perm("products.delete")).requirements(),
            &[
                Requirement::Admin,
                Requirement::Permission(perm("products.delete"))
            ]
        );
    }

    #[test]
    fn first_denial_short_circuits() {
        let store = CountingStore::new(MemoryStore::new());
        let customer = store.inner().create_role("customer", "").unwrap();
        store.inner().assign(PrincipalId::new(1), customer.id).unwrap();
        let sessions = StaticSessions::new().with_session(
            "tok",
            Principal::new(PrincipalId::new(1), "c@example.com", "C"),
        );

        let err = Guard::permission(perm("orders.read"))
            .without_audit()
            .evaluate(&sessions, &store, "tok")
            .unwrap_err();

        assert!(matches!(err, AccessError::ForbiddenNotAdmin));
        // Roles were read; the permission requirement never ran.
        assert_eq!(store.counts().role_lookups, 1);
        assert_eq!(store.counts().permission_checks, 0);
    }

    #[test]
    fn context_reuses_roles() {
        let store = CountingStore::new(MemoryStore::new());
        let admin = store.inner().create_role("super_admin", "").unwrap();
        store.inner().assign(PrincipalId::new(1), admin.id).unwrap();
        let sessions = StaticSessions::new().with_session(
            "tok",
            Principal::new(PrincipalId::new(1), "a@example.com", "A"),
        );

        let context = Guard::admin()
            .without_audit()
            .evaluate(&sessions, &store, "tok")
            .unwrap();
        assert!(context.is_admin());

        context.require_permission(&store, &perm("products.delete")).unwrap();
        assert_eq!(store.counts().role_lookups, 1);
    }
}
