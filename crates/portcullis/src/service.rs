//! The [`Portcullis`] service: a store and a session resolver bundled with
//! the policy knobs from [`PortcullisConfig`].

use anyhow::{Context, Result};
use portcullis_config::{PortcullisConfig, RoleListing};
use portcullis_rbac::{
    AccessContext, AccessError, AccessSummary, Guard, RoleSummary, SessionResolver,
};
use portcullis_store::{AccessStore, MemoryStore, Seed};
use portcullis_types::PermissionName;
use tracing::info;

/// Authorization entry point for a host application.
///
/// Every method takes the caller's raw credentials and runs them through a
/// fresh [`Guard`]; nothing about a caller is remembered between calls.
#[derive(Debug)]
pub struct Portcullis<S, R> {
    store: S,
    sessions: R,
    audit_enabled: bool,
    role_listing: RoleListing,
}

impl<R: SessionResolver> Portcullis<MemoryStore, R> {
    /// Builds an in-memory service, provisioned from `config.store.seed_file`
    /// when one is set.
    pub fn from_config(config: &PortcullisConfig, sessions: R) -> Result<Self> {
        let store = match &config.store.seed_file {
            Some(path) => {
                let seed = Seed::load(path)
                    .with_context(|| format!("Failed to load seed file {}", path.display()))?;
                MemoryStore::from_seed(&seed)
                    .with_context(|| format!("Failed to apply seed file {}", path.display()))?
            }
            None => MemoryStore::new(),
        };

        info!(
            seeded = config.store.seed_file.is_some(),
            audit = config.audit.enabled,
            listing = ?config.roles.listing,
            "Portcullis initialized"
        );

        Ok(Self::new(store, sessions)
            .with_audit(config.audit.enabled)
            .with_role_listing(config.roles.listing))
    }
}

impl<S: AccessStore, R: SessionResolver> Portcullis<S, R> {
    /// Audit logging on, role listing public.
    pub fn new(store: S, sessions: R) -> Self {
        Self {
            store,
            sessions,
            audit_enabled: true,
            role_listing: RoleListing::Public,
        }
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn with_role_listing(mut self, listing: RoleListing) -> Self {
        self.role_listing = listing;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions(&self) -> &R {
        &self.sessions
    }

    pub fn role_listing(&self) -> RoleListing {
        self.role_listing
    }

    /// Session-only guard carrying this service's audit setting.
    pub fn guard(&self) -> Guard {
        Guard::authenticated().with_audit(self.audit_enabled)
    }

    /// Session plus admin-tier guard.
    pub fn admin_guard(&self) -> Guard {
        Guard::admin().with_audit(self.audit_enabled)
    }

    /// Session, admin-tier and `permission` guard.
    pub fn permission_guard(&self, permission: PermissionName) -> Guard {
        Guard::permission(permission).with_audit(self.audit_enabled)
    }

    /// Runs `action` behind an arbitrary guard.
    pub fn run<T, E, F>(
        &self,
        guard: &Guard,
        credentials: &R::Credentials,
        action: F,
    ) -> Result<T, E>
    where
        F: FnOnce(AccessContext) -> Result<T, E>,
        E: From<AccessError>,
    {
        guard.run(&self.sessions, &self.store, credentials, action)
    }

    /// The caller's roles and admin flag. Requires a session, nothing more.
    pub fn check_access(
        &self,
        credentials: &R::Credentials,
    ) -> Result<AccessSummary, AccessError> {
        let context = self.guard().evaluate(&self.sessions, &self.store, credentials)?;
        Ok(AccessSummary::from(&context.roles))
    }

    /// The role catalogue, gated by the configured [`RoleListing`].
    ///
    /// Under [`RoleListing::Public`] the credentials are not looked at.
    pub fn list_roles(
        &self,
        credentials: &R::Credentials,
    ) -> Result<Vec<RoleSummary>, AccessError> {
        if self.role_listing == RoleListing::AdminOnly {
            self.admin_guard()
                .evaluate(&self.sessions, &self.store, credentials)?;
        }
        portcullis_rbac::list_roles(&self.store)
    }

    /// Names of the permissions granted to the caller. Requires a session.
    pub fn effective_permissions(
        &self,
        credentials: &R::Credentials,
    ) -> Result<Vec<String>, AccessError> {
        let context = self.guard().evaluate(&self.sessions, &self.store, credentials)?;
        portcullis_rbac::effective_permissions(&self.store, context.principal_id())
    }

    /// Runs `action` for an authenticated admin-tier caller.
    pub fn require_admin<T, E, F>(&self, credentials: &R::Credentials, action: F) -> Result<T, E>
    where
        F: FnOnce(AccessContext) -> Result<T, E>,
        E: From<AccessError>,
    {
        self.run(&self.admin_guard(), credentials, action)
    }

    /// Runs `action` for an authenticated admin-tier caller holding
    /// `permission` (or `super_admin`).
    pub fn require_permission<T, E, F>(
        &self,
        credentials: &R::Credentials,
        permission: &PermissionName,
        action: F,
    ) -> Result<T, E>
    where
        F: FnOnce(AccessContext) -> Result<T, E>,
        E: From<AccessError>,
    {
        self.run(&self.permission_guard(permission.clone()), credentials, action)
    }
}
