//! End-to-end tests: a project directory on disk, loaded through the
//! config layers into a seeded service.

use std::fs;
use std::path::Path;

use tempfile::{TempDir, tempdir};
use test_case::test_case;

use crate::*;

const SEED: &str = r#"
[[permissions]]
name = "products.delete"
description = "Delete products"

[[permissions]]
name = "cms.pages.create"

[[permissions]]
name = "orders.read"

[[roles]]
name = "super_admin"
description = "Full access"

[[roles]]
name = "editor"
permissions = ["cms.pages.create"]

[[roles]]
name = "content_manager"
permissions = ["cms.pages.create", "products.delete"]

[[roles]]
name = "customer"
permissions = ["orders.read"]

[[assignments]]
principal = 1
roles = ["super_admin"]

[[assignments]]
principal = 2
roles = ["editor"]

[[assignments]]
principal = 3
roles = ["customer"]

[[assignments]]
principal = 4
roles = ["customer", "content_manager"]
"#;

fn write_project(dir: &Path, listing: &str) {
    fs::create_dir_all(dir.join("fixtures")).unwrap();
    fs::write(dir.join("fixtures/rbac.toml"), SEED).unwrap();
    fs::write(
        dir.join("portcullis.toml"),
        format!(
            r#"
[audit]
enabled = false

[store]
seed_file = "fixtures/rbac.toml"

[roles]
listing = "{listing}"
"#
        ),
    )
    .unwrap();
}

fn sessions() -> StaticSessions {
    let mut sessions = StaticSessions::new();
    let tokens = [
        ("tok-root", 1),
        ("tok-editor", 2),
        ("tok-customer", 3),
        ("tok-cm", 4),
        ("tok-new", 5),
    ];
    for (token, id) in tokens {
        sessions = sessions.with_session(
            token,
            Principal::new(PrincipalId::new(id), format!("{token}@example.com"), token),
        );
    }
    sessions
}

fn load(listing: &str) -> (TempDir, Portcullis<MemoryStore, StaticSessions>) {
    let dir = tempdir().unwrap();
    write_project(dir.path(), listing);
    let config = ConfigLoader::new()
        .with_project_dir(dir.path())
        .with_env_prefix("PORTCULLIS_FACADE_TEST")
        .without_user_config()
        .load()
        .unwrap();
    let service = Portcullis::from_config(&config, sessions()).unwrap();
    (dir, service)
}

fn perm(name: &str) -> PermissionName {
    PermissionName::new(name).unwrap()
}

#[test]
fn seeded_service_reports_roles() {
    let (_dir, service) = load("public");

    let summary = service.check_access("tok-cm").unwrap();
    assert!(summary.is_admin);
    assert_eq!(summary.roles, vec!["content_manager", "customer"]);

    let summary = service.check_access("tok-new").unwrap();
    assert!(!summary.is_admin);
    assert!(summary.roles.is_empty());
}

#[test_case("tok-root", true; "super admin")]
#[test_case("tok-editor", false; "editor without grant")]
#[test_case("tok-customer", false; "customer")]
#[test_case("tok-cm", true; "content manager with grant")]
fn product_deletion(token: &str, allowed: bool) {
    let (_dir, service) = load("public");

    let result = service.require_permission(token, &perm("products.delete"), |_| {
        Ok::<_, AccessError>("deleted")
    });
    assert_eq!(result.is_ok(), allowed);
    if let Err(err) = result {
        assert!(err.is_forbidden());
    }
}

#[test]
fn customer_is_stopped_at_the_admin_gate() {
    let (_dir, service) = load("public");

    // The customer holds orders.read, but is not admin tier.
    let err = service
        .require_permission("tok-customer", &perm("orders.read"), |_| Ok::<_, AccessError>(()))
        .unwrap_err();
    assert!(matches!(err, AccessError::ForbiddenNotAdmin));
}

#[test]
fn missing_session_is_unauthenticated() {
    let (_dir, service) = load("public");

    let mut ran = false;
    let err = service
        .require_admin("tok-unknown", |_| {
            ran = true;
            Ok::<_, AccessError>(())
        })
        .unwrap_err();
    assert!(err.requires_login());
    assert!(!ran);
}

#[test]
fn listing_policy_comes_from_config() {
    let (_public_dir, public) = load("public");
    assert_eq!(public.list_roles("").unwrap().len(), 4);

    let (_guarded_dir, guarded) = load("admin-only");
    assert!(guarded.list_roles("").unwrap_err().requires_login());
    assert!(guarded.list_roles("tok-customer").unwrap_err().is_forbidden());
    assert_eq!(guarded.list_roles("tok-editor").unwrap().len(), 4);
}

#[test]
fn effective_permissions_are_the_union() {
    let (_dir, service) = load("public");
    assert_eq!(
        service.effective_permissions("tok-cm").unwrap(),
        vec!["cms.pages.create", "orders.read", "products.delete"]
    );
    assert!(service.effective_permissions("tok-root").unwrap().is_empty());
}

#[test]
fn summary_json_shape() {
    let (_dir, service) = load("public");
    let json = serde_json::to_value(service.check_access("tok-editor").unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "isAdmin": true, "roles": ["editor"] }));
}

#[test]
fn missing_seed_file_fails_to_build() {
    let mut config = PortcullisConfig::testing();
    config.store.seed_file = Some("/nonexistent/portcullis/rbac.toml".into());

    let err = Portcullis::from_config(&config, StaticSessions::new()).unwrap_err();
    assert!(err.to_string().contains("Failed to load seed file"));
}

#[test]
fn seed_with_unknown_role_fails_to_build() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rbac.toml");
    fs::write(
        &path,
        r#"
[[assignments]]
principal = 1
roles = ["ghost"]
"#,
    )
    .unwrap();

    let mut config = PortcullisConfig::testing();
    config.store.seed_file = Some(path);
    assert!(Portcullis::from_config(&config, StaticSessions::new()).is_err());
}
