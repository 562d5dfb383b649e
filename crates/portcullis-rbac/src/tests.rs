//! Decision and guard tests for portcullis-rbac

use std::cell::Cell;

use portcullis_store::{AccessStore, CountingStore, MemoryStore, StoreError, StoreResult};
use portcullis_types::{Permission, PermissionName, Principal, PrincipalId, Role, RoleSet};

use crate::{
    AccessDecisionEngine, AccessError, Decision, DenyReason, Guard, InternalError, SessionError,
    SessionResolver, StaticSessions, check_access,
};

// ============================================================================
// Fixtures
// ============================================================================

fn perm(name: &str) -> PermissionName {
    PermissionName::new(name).unwrap()
}

fn principal(id: u64) -> Principal {
    Principal::new(PrincipalId::new(id), format!("user{id}@example.com"), format!("User {id}"))
}

/// A storefront with an editor (principal 1), a customer (principal 2), a
/// superuser without grants (principal 3) and a principal holding nothing
/// (principal 4).
struct Storefront {
    store: CountingStore<MemoryStore>,
    sessions: StaticSessions,
}

impl Storefront {
    fn new() -> Self {
        let store = MemoryStore::new();
        let super_admin = store.create_role("super_admin", "Everything").unwrap();
        let editor = store.create_role("editor", "Content").unwrap();
        let customer = store.create_role("customer", "Buyer").unwrap();

        let create = store.create_permission(perm("cms.pages.create"), "").unwrap();
        store.create_permission(perm("products.delete"), "").unwrap();
        let orders = store.create_permission(perm("orders.read"), "").unwrap();

        store.grant(editor.id, create.id).unwrap();
        store.grant(customer.id, orders.id).unwrap();

        store.assign(PrincipalId::new(1), editor.id).unwrap();
        store.assign(PrincipalId::new(2), customer.id).unwrap();
        store.assign(PrincipalId::new(3), super_admin.id).unwrap();

        let sessions = StaticSessions::new()
            .with_session("tok-editor", principal(1))
            .with_session("tok-customer", principal(2))
            .with_session("tok-root", principal(3))
            .with_session("tok-nobody", principal(4));

        Self {
            store: CountingStore::new(store),
            sessions,
        }
    }

    fn memory(&self) -> &MemoryStore {
        self.store.inner()
    }

    fn allows(&self, token: &str, permission: &str) -> bool {
        Guard::authenticated()
            .require_permission(perm(permission))
            .without_audit()
            .evaluate(&self.sessions, &self.store, token)
            .is_ok()
    }
}

/// Store whose every query fails.
struct BrokenStore;

impl AccessStore for BrokenStore {
    fn role_names_of(&self, _: PrincipalId) -> StoreResult<Vec<String>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn principal_has_permission(&self, _: PrincipalId, _: &PermissionName) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn permissions_of(&self, _: PrincipalId) -> StoreResult<Vec<Permission>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Session backend that is down.
struct BrokenSessions;

impl SessionResolver for BrokenSessions {
    type Credentials = str;

    fn get_session(&self, _: &str) -> Result<Option<Principal>, SessionError> {
        Err(SessionError::Unavailable("session cache unreachable".to_string()))
    }
}

// ============================================================================
// check_access
// ============================================================================

#[test]
fn principal_without_roles_is_not_admin() {
    let shop = Storefront::new();
    let summary = check_access(&shop.store, PrincipalId::new(4)).unwrap();
    assert!(!summary.is_admin);
    assert!(summary.roles.is_empty());

    let summary = check_access(&shop.store, PrincipalId::new(404)).unwrap();
    assert!(!summary.is_admin);
    assert!(summary.roles.is_empty());
}

#[test]
fn check_access_reports_roles() {
    let shop = Storefront::new();
    let summary = check_access(&shop.store, PrincipalId::new(1)).unwrap();
    assert!(summary.is_admin);
    assert_eq!(summary.roles, vec!["editor"]);

    let summary = check_access(&shop.store, PrincipalId::new(2)).unwrap();
    assert!(!summary.is_admin);
    assert_eq!(summary.roles, vec!["customer"]);
}

// ============================================================================
// Permission decisions
// ============================================================================

#[test]
fn editor_holds_only_granted_permissions() {
    let shop = Storefront::new();
    assert!(shop.allows("tok-editor", "cms.pages.create"));
    assert!(!shop.allows("tok-editor", "products.delete"));
}

#[test]
fn super_admin_without_grants_passes_permission_checks() {
    let shop = Storefront::new();
    let root = shop.memory().role_by_name("super_admin").unwrap().unwrap();
    assert!(shop.memory().grants().unwrap().iter().all(|g| g.role_id != root.id));

    assert!(shop.allows("tok-root", "products.delete"));
    assert!(shop.allows("tok-root", "never.provisioned"));
}

#[test]
fn permissions_are_the_union_over_roles() {
    let shop = Storefront::new();
    let editor = shop.memory().role_by_name("editor").unwrap().unwrap();
    // Principal 2 now holds customer (orders.read) and editor (cms.pages.create).
    shop.memory().assign(PrincipalId::new(2), editor.id).unwrap();

    assert!(shop.allows("tok-customer", "orders.read"));
    assert!(shop.allows("tok-customer", "cms.pages.create"));
    assert!(!shop.allows("tok-customer", "products.delete"));
}

#[test]
fn revocation_applies_to_the_next_check() {
    let shop = Storefront::new();
    let editor = shop.memory().role_by_name("editor").unwrap().unwrap();
    assert!(shop.allows("tok-editor", "cms.pages.create"));

    shop.memory().unassign(PrincipalId::new(1), editor.id).unwrap();

    assert!(!shop.allows("tok-editor", "cms.pages.create"));
}

#[test]
fn reassigning_a_held_role_changes_nothing() {
    let shop = Storefront::new();
    let editor = shop.memory().role_by_name("editor").unwrap().unwrap();

    assert!(!shop.memory().assign(PrincipalId::new(1), editor.id).unwrap());
    assert_eq!(
        check_access(&shop.store, PrincipalId::new(1)).unwrap().roles,
        vec!["editor"]
    );

    // A single unassign is enough to revoke: nothing was double-counted.
    shop.memory().unassign(PrincipalId::new(1), editor.id).unwrap();
    assert!(!shop.allows("tok-editor", "cms.pages.create"));
}

#[test]
fn permission_decision_names_missing_permission() {
    let shop = Storefront::new();
    let roles: RoleSet = ["editor"].into_iter().collect();
    let decision = AccessDecisionEngine::new(&shop.store)
        .without_audit()
        .permission_decision(PrincipalId::new(1), &roles, &perm("products.delete"))
        .unwrap();

    assert_eq!(
        decision,
        Decision::Deny(DenyReason::MissingPermission(perm("products.delete")))
    );
}

// ============================================================================
// Admin decisions
// ============================================================================

#[test]
fn customer_is_not_admin() {
    let shop = Storefront::new();
    let err = Guard::admin()
        .without_audit()
        .evaluate(&shop.sessions, &shop.store, "tok-customer")
        .unwrap_err();
    assert!(matches!(err, AccessError::ForbiddenNotAdmin));
}

#[test]
fn admin_gate_does_not_imply_permissions() {
    let shop = Storefront::new();
    // editor passes the admin gate but lacks products.delete.
    let err = Guard::permission(perm("products.delete"))
        .without_audit()
        .evaluate(&shop.sessions, &shop.store, "tok-editor")
        .unwrap_err();
    assert!(matches!(err, AccessError::ForbiddenMissingPermission { .. }));
}

#[test]
fn permission_check_usable_without_admin_gate() {
    let shop = Storefront::new();
    // customer is not admin-tier but holds orders.read.
    assert!(shop.allows("tok-customer", "orders.read"));
    assert!(
        Guard::permission(perm("orders.read"))
            .without_audit()
            .evaluate(&shop.sessions, &shop.store, "tok-customer")
            .is_err()
    );
}

// ============================================================================
// Guard short-circuiting
// ============================================================================

#[test]
fn unauthenticated_calls_never_touch_the_store() {
    let shop = Storefront::new();
    let ran = Cell::new(false);

    for guard in [
        Guard::authenticated(),
        Guard::admin(),
        Guard::permission(perm("products.delete")),
    ] {
        for token in ["", "tok-unknown"] {
            let err = guard
                .clone()
                .without_audit()
                .run(&shop.sessions, &shop.store, token, |_| {
                    ran.set(true);
                    Ok::<_, AccessError>(())
                })
                .unwrap_err();
            assert!(err.requires_login());
        }
    }

    assert!(!ran.get());
    assert_eq!(shop.store.counts().total(), 0);
}

#[test]
fn denied_action_does_not_run() {
    let shop = Storefront::new();
    let ran = Cell::new(false);

    let result = Guard::admin().without_audit().run(
        &shop.sessions,
        &shop.store,
        "tok-customer",
        |_| {
            ran.set(true);
            Ok::<_, AccessError>(())
        },
    );

    assert!(result.is_err());
    assert!(!ran.get());
}

#[test]
fn allowed_action_receives_resolved_roles() {
    let shop = Storefront::new();

    let roles = Guard::permission(perm("cms.pages.create"))
        .without_audit()
        .run(&shop.sessions, &shop.store, "tok-editor", |ctx| {
            assert_eq!(ctx.principal.email, "user1@example.com");
            Ok::<_, AccessError>(ctx.roles)
        })
        .unwrap();

    assert_eq!(roles.to_vec(), vec!["editor"]);
    // One role lookup for the whole call, however many requirements.
    assert_eq!(shop.store.counts().role_lookups, 1);
}

#[test]
fn action_errors_pass_through() {
    #[derive(Debug)]
    enum AppError {
        Access(AccessError),
        Conflict,
    }

    impl From<AccessError> for AppError {
        fn from(err: AccessError) -> Self {
            AppError::Access(err)
        }
    }

    let shop = Storefront::new();
    let result: Result<(), AppError> = Guard::admin().without_audit().run(
        &shop.sessions,
        &shop.store,
        "tok-editor",
        |_| Err(AppError::Conflict),
    );
    assert!(matches!(result, Err(AppError::Conflict)));

    let result: Result<(), AppError> =
        Guard::admin()
            .without_audit()
            .run(&shop.sessions, &shop.store, "", |_| Ok(()));
    assert!(matches!(
        result,
        Err(AppError::Access(AccessError::Unauthenticated))
    ));
}

// ============================================================================
// Internal failures
// ============================================================================

#[test]
fn store_failure_is_internal_not_forbidden() {
    let sessions = StaticSessions::new().with_session("tok", principal(1));

    let err = Guard::admin()
        .without_audit()
        .evaluate(&sessions, &BrokenStore, "tok")
        .unwrap_err();

    assert!(err.is_internal());
    assert!(!err.is_forbidden());
    assert!(matches!(
        err,
        AccessError::Internal(InternalError::Store(StoreError::Unavailable(_)))
    ));
}

#[test]
fn permission_store_failure_is_internal() {
    let roles: RoleSet = ["editor"].into_iter().collect();
    let err = AccessDecisionEngine::new(&BrokenStore)
        .without_audit()
        .enforce_permission(PrincipalId::new(1), &roles, &perm("products.delete"))
        .unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn super_admin_bypass_survives_store_outage() {
    let roles: RoleSet = ["super_admin"].into_iter().collect();
    let engine = AccessDecisionEngine::new(&BrokenStore).without_audit();
    assert!(
        engine
            .enforce_permission(PrincipalId::new(3), &roles, &perm("products.delete"))
            .is_ok()
    );
}

#[test]
fn session_failure_is_internal_and_skips_store() {
    let shop = Storefront::new();
    let err = Guard::authenticated()
        .without_audit()
        .evaluate(&BrokenSessions, &shop.store, "tok-editor")
        .unwrap_err();

    assert!(matches!(
        err,
        AccessError::Internal(InternalError::Session(_))
    ));
    assert_eq!(shop.store.counts().total(), 0);
}

// ============================================================================
// Properties
// ============================================================================

use proptest::prelude::*;

fn permission_name() -> impl Strategy<Value = PermissionName> {
    ("[a-z][a-z0-9_]{0,10}", "[a-z][a-z0-9_-]{0,10}")
        .prop_map(|(resource, action)| perm(&format!("{resource}.{action}")))
}

proptest! {
    /// The superuser passes any permission check with an empty store.
    #[test]
    fn super_admin_bypasses_any_permission(name in permission_name()) {
        let store = CountingStore::new(MemoryStore::new());
        let roles: RoleSet = ["super_admin"].into_iter().collect();

        let decision = AccessDecisionEngine::new(&store)
            .without_audit()
            .permission_decision(PrincipalId::new(1), &roles, &name)
            .unwrap();

        prop_assert_eq!(decision, Decision::Allow);
        prop_assert_eq!(store.counts().total(), 0);
    }

    /// Only the three admin roles open the admin tier.
    #[test]
    fn admin_set_is_exact(role in "[a-z_]{1,16}") {
        let store = MemoryStore::new();
        let roles: RoleSet = [role.as_str()].into_iter().collect();
        let expected = matches!(role.as_str(), "super_admin" | "editor" | "content_manager");

        let decision = AccessDecisionEngine::new(&store)
            .without_audit()
            .admin_decision(PrincipalId::new(1), &roles);

        prop_assert_eq!(decision.is_allowed(), expected);
    }

    /// Each role contributes its grants; holding all roles yields every
    /// permission any of them grants.
    #[test]
    fn every_role_contributes_its_grants(
        names in proptest::collection::btree_set(permission_name(), 1..6),
    ) {
        let store = MemoryStore::new();
        let principal = PrincipalId::new(9);

        for (i, name) in names.iter().enumerate() {
            let role = store.create_role(format!("role_{i}"), "").unwrap();
            let permission = store.create_permission(name.clone(), "").unwrap();
            store.grant(role.id, permission.id).unwrap();
            store.assign(principal, role.id).unwrap();
        }

        let roles = crate::RoleResolver::new(&store).roles_of(principal).unwrap();
        let engine = AccessDecisionEngine::new(&store).without_audit();
        for name in &names {
            prop_assert!(engine.permission_decision(principal, &roles, name).unwrap().is_allowed());
        }
    }
}
