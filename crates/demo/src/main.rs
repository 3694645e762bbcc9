//! Custodian walkthrough.
//!
//! Runs three short scenarios and reports through `tracing`:
//!
//! 1. A particle system sharing five looks across a thousand particles.
//! 2. Lazy, caching and protected mediators over simulated image loads.
//! 3. Configuration and database singletons resolved from one context.
//!
//! # Usage
//!
//! ```bash
//! custodian-demo [--json]
//! RUST_LOG=debug custodian-demo
//! ```

use custodian_lifecycle::{ConfigRegistry, Connection, Context, LifecycleError};
use custodian_mediator::{Mediated, Mediator, MediatorError, Role, SimulatedLoader};
use custodian_pool::{PoolError, ParticleSystem};
use custodian_tracing::{TracingConfig, TracingFormat};
use std::sync::Arc;

const COLORS: [&str; 5] = ["red", "blue", "green", "yellow", "purple"];
const SPRITES: [&str; 5] = ["fire", "water", "leaf", "star", "diamond"];

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Mediator(#[from] MediatorError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

fn main() {
    let format = if std::env::args().any(|arg| arg == "--json") {
        TracingFormat::Json
    } else {
        TracingFormat::Compact
    };
    TracingConfig::new().with_format(format).init();

    if let Err(err) = run(Context::global()) {
        tracing::error!(error = %err, "demo failed");
        std::process::exit(1);
    }
}

fn run(ctx: &Arc<Context>) -> Result<(), DemoError> {
    particles()?;
    mediators()?;
    singletons(ctx)?;
    Ok(())
}

fn particles() -> Result<(), DemoError> {
    let _span = tracing::info_span!("particles").entered();
    let mut system = ParticleSystem::new();

    for i in 0..1000_u32 {
        let step = f64::from(i);
        let look = i as usize;
        system.add_particle(
            step % 800.0,
            (step * 7.0) % 600.0,
            (step % 11.0) - 5.0,
            (step % 7.0) - 3.0,
            COLORS[look % COLORS.len()],
            SPRITES[(look / COLORS.len()) % SPRITES.len()],
        )?;
    }

    for frame in system.render().iter().take(3) {
        tracing::info!(%frame, "rendered");
    }
    system.update();

    tracing::info!(
        kinds = ?system.list_flyweights().iter().map(ToString::to_string).collect::<Vec<_>>(),
        usage = %system.memory_usage(),
        "particle system ready"
    );
    Ok(())
}

fn mediators() -> Result<(), DemoError> {
    let _span = tracing::info_span!("mediators").entered();
    let loader = Arc::new(SimulatedLoader::new());

    let lazy = Mediator::lazy("photo1.jpg", Arc::clone(&loader));
    tracing::info!(
        size = ?lazy.size()?,
        phase = %lazy.phase(),
        "lazy size before display"
    );
    for _ in 0..2 {
        tracing::info!(shown = ?lazy.display()?, "lazy display");
    }

    let caching = Mediator::caching("large_image.jpg", Arc::clone(&loader));
    for _ in 0..3 {
        tracing::info!(
            size = ?caching.size()?,
            shown = ?caching.display()?,
            "caching access"
        );
    }
    if let Mediator::Caching(inner) = &caching {
        tracing::info!(stats = ?inner.cache_stats(), "caching stats");
    }

    for role in [Role::Guest, Role::Admin] {
        let protected = Mediator::protected("confidential_data.jpg", Arc::clone(&loader), role);
        let shown = protected.display()?;
        let size = protected.size()?.unwrap_or_default();
        tracing::info!(%role, granted = shown.is_granted(), size, "protected access");
    }

    tracing::info!(loads = loader.loads(), "simulated loads");
    Ok(())
}

fn singletons(ctx: &Arc<Context>) -> Result<(), DemoError> {
    let _span = tracing::info_span!("singletons").entered();

    let config = ctx.instance::<ConfigRegistry>();
    tracing::info!(
        api_key = ?config.get("api_key"),
        environment = ?config.get("environment"),
        "configuration"
    );
    ctx.instance::<ConfigRegistry>().set("new_feature", "enabled");
    tracing::info!(
        new_feature = ?ctx.instance::<ConfigRegistry>().get("new_feature"),
        same = Arc::ptr_eq(&config, &ctx.instance::<ConfigRegistry>()),
        "configuration shared"
    );

    let db = ctx.instance::<Connection>();
    tracing::info!(result = %db.query("SELECT * FROM users")?, "query");
    let again = ctx.instance::<Connection>();
    tracing::info!(
        result = %again.query("SELECT * FROM products")?,
        same = Arc::ptr_eq(&db, &again),
        "query"
    );

    for (key, value) in config.snapshot() {
        tracing::info!(%key, %value, "setting");
    }
    tracing::info!(singletons = ?ctx.type_names(), "context");
    Ok(())
}
