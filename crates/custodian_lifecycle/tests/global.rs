//! Tests for the process-wide `Context`.
//!
//! Kept in their own test binary so no other test touches the global
//! registry.

use std::sync::{Arc, Barrier};
use std::thread;

use custodian_lifecycle::{ConfigRegistry, Context};

/// Test every global lookup, from any thread, yields one registry.
#[test]
fn global_registry_is_one_per_process() {
    assert!(Arc::ptr_eq(Context::global(), Context::global()));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                Context::global().instance::<ConfigRegistry>()
            })
        })
        .collect();

    let registries: Vec<Arc<ConfigRegistry>> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .collect();

    let first = Context::global().instance::<ConfigRegistry>();
    assert!(registries.iter().all(|registry| Arc::ptr_eq(registry, &first)));
    assert_eq!(first.load_count(), 1);
    assert_eq!(Context::global().constructions::<ConfigRegistry>(), 1);

    registries[3].set("new_feature", "enabled");
    assert_eq!(first.get("new_feature").as_deref(), Some("enabled"));

    let scoped = Context::new().instance::<ConfigRegistry>();
    assert!(!Arc::ptr_eq(&scoped, &first));
    assert_eq!(scoped.get("new_feature"), None);
}
