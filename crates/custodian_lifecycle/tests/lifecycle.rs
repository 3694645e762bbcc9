//! Integration tests for `Context` and the built-in singletons.

use std::sync::Arc;

use custodian_lifecycle::{ConfigRegistry, Connection, Context, DEFAULT_SETTINGS, LifecycleError};

#[test]
fn configuration_changes_are_visible_through_every_handle() {
    let ctx = Context::new();

    let config1 = ctx.instance::<ConfigRegistry>();
    assert_eq!(config1.get("api_key").as_deref(), Some("sk-1234567890abcdef"));

    let config2 = ctx.instance::<ConfigRegistry>();
    config2.set("new_feature", "enabled");

    let config3 = ctx.instance::<ConfigRegistry>();
    assert_eq!(config3.get("new_feature").as_deref(), Some("enabled"));

    assert!(Arc::ptr_eq(&config1, &config2));
    assert!(Arc::ptr_eq(&config2, &config3));
    assert_eq!(config1.load_count(), 1);
    assert_eq!(config1.snapshot().len(), DEFAULT_SETTINGS.len() + 1);
}

#[test]
fn connection_is_reused_and_closes_for_everyone() {
    let ctx = Context::new();

    let db1 = ctx.instance::<Connection>();
    let first = db1.query("SELECT * FROM users").unwrap();
    assert_eq!(
        first,
        format!("Executing query: SELECT * FROM users | connection: {}", db1.id())
    );

    let db2 = ctx.instance::<Connection>();
    assert_eq!(db1.id(), db2.id());

    db2.close();
    assert_eq!(
        db1.query("SELECT * FROM products").unwrap_err(),
        LifecycleError::NotConnected {
            id: db1.id().to_string()
        }
    );
    assert_eq!(ctx.constructions::<Connection>(), 1);
}

#[test]
fn fresh_context_starts_empty() {
    let ctx = Context::new();
    ctx.instance::<Connection>();

    let fresh = Context::new();
    assert!(fresh.is_empty());
    assert!(fresh.get::<Connection>().is_none());

    let other = fresh.instance::<Connection>();
    assert_ne!(other.id(), ctx.instance::<Connection>().id());
}
