//! Integration tests for the three mediator policies.

use std::sync::Arc;

use custodian_mediator::{
    Access, AccessPolicy, Classification, Mediated, Mediator, Phase, ProtectedMediator, Role,
    SimulatedLoader,
};

fn loader() -> Arc<SimulatedLoader> {
    Arc::new(SimulatedLoader::instant())
}

#[test]
fn lazy_metadata_never_constructs() {
    let loader = loader();
    let image = Mediator::lazy("photo1.jpg", Arc::clone(&loader));

    for _ in 0..5 {
        assert_eq!(image.size().unwrap(), Access::Granted(750));
    }
    assert_eq!(image.phase(), Phase::Unconstructed);
    assert_eq!(loader.attempts(), 0);

    image.display().unwrap();
    image.display().unwrap();
    assert_eq!(loader.loads(), 1);
    assert_ne!(image.size().unwrap(), Access::Granted(750));
}

#[test]
fn caching_size_is_stable_across_calls() {
    let loader = loader();
    let image = Mediator::caching("large_image.jpg", Arc::clone(&loader));

    let sizes: Vec<u64> = (0..4)
        .map(|_| image.size().unwrap().unwrap_or_default())
        .collect();

    assert!(sizes.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(loader.loads(), 1);

    let Mediator::Caching(inner) = &image else {
        panic!("expected a caching mediator");
    };
    assert_eq!(inner.cache_stats().computations, 1);
}

#[test]
fn protected_denial_depends_on_role() {
    let loader = loader();
    let cases = [
        ("public_photo.jpg", Role::Guest, true),
        ("premium_content.jpg", Role::Guest, false),
        ("premium_content.jpg", Role::User, true),
        ("confidential_data.jpg", Role::User, false),
        ("confidential_data.jpg", Role::Admin, true),
    ];

    for (identifier, role, expected) in cases {
        let image = Mediator::protected(identifier, Arc::clone(&loader), role);
        let shown = image.display().unwrap();
        assert_eq!(shown.is_granted(), expected, "{identifier} as {role}");

        if !expected {
            assert_eq!(image.size().unwrap().unwrap_or_default(), 0);
            assert_eq!(image.phase(), Phase::Unconstructed);
        }
    }
}

#[test]
fn policy_loads_from_json() {
    let json = r#"{
        "resources": { "board_minutes.pdf": "restricted" },
        "markers": [ { "marker": "premium", "classification": "premium" } ],
        "minimum_roles": { "public": "guest", "premium": "user", "restricted": "admin" }
    }"#;
    let policy: AccessPolicy = serde_json::from_str(json).unwrap();

    assert_eq!(policy.classify("board_minutes.pdf"), Classification::Restricted);
    assert_eq!(policy.classify("premium_intro.mp4"), Classification::Premium);
    assert_eq!(policy.classify("confidential_data.jpg"), Classification::Public);

    let image = ProtectedMediator::new("board_minutes.pdf", loader(), Role::User)
        .with_policy(Arc::new(policy));
    let denial = image.display().unwrap().denial().cloned().unwrap();
    assert_eq!(
        denial.to_string(),
        "access denied for user to 'board_minutes.pdf' (restricted)"
    );
}

#[test]
fn policy_without_minimum_roles_is_rejected() {
    let json = r#"{ "resources": {} }"#;
    assert!(serde_json::from_str::<AccessPolicy>(json).is_err());
}

#[test]
fn mediators_are_interchangeable_behind_the_trait() {
    let loader = loader();
    let mediators: Vec<Box<dyn Mediated>> = vec![
        Box::new(Mediator::lazy("a.jpg", Arc::clone(&loader))),
        Box::new(Mediator::caching("b.jpg", Arc::clone(&loader))),
        Box::new(Mediator::protected("c.jpg", Arc::clone(&loader), Role::Guest)),
    ];

    for mediator in &mediators {
        let shown = mediator.display().unwrap().granted().unwrap();
        assert!(shown.ends_with(mediator.identifier()));
        assert_eq!(mediator.phase(), Phase::Constructed);
    }
    assert_eq!(loader.loads(), 3);
}
