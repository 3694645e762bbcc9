//! Explicit registry of singletons.
//!
//! A [`Context`] owns one [`Lifecycle`] per singleton type. Whoever needs a
//! singleton receives the context (or an `Arc` of it) and asks it for the
//! instance.
//!
//! [`Context::global`] is the process-wide context: every lookup through it
//! yields the same instance for the life of the process. Contexts made with
//! [`Context::new`] are separate scopes that never share instances with each
//! other or with the global one.

use crate::lifecycle::Lifecycle;
use core::any::{Any, TypeId};
use core::fmt;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Arc<Context>> = LazyLock::new(|| {
    tracing::debug!("creating process-wide context");
    Arc::new(Context::new())
});

/// A type with exactly one instance per [`Context`].
///
/// `construct` may request other singletons from `ctx`. Dependencies must
/// not be cyclic.
///
/// # Example
///
/// ```
/// use custodian_lifecycle::{Context, Singleton};
///
/// struct Greeter { greeting: String }
///
/// impl Singleton for Greeter {
///     fn construct(_ctx: &Context) -> Self {
///         Self { greeting: "hello".into() }
///     }
/// }
///
/// let ctx = Context::new();
/// assert_eq!(ctx.instance::<Greeter>().greeting, "hello");
/// ```
pub trait Singleton: Send + Sync + Sized + 'static {
    /// Builds the instance.
    fn construct(ctx: &Context) -> Self;
}

/// Type-erased view of a `Lifecycle<T>` stored in the registry.
trait ErasedLifecycle: Send + Sync {
    fn is_initialized(&self) -> bool;
    fn type_name(&self) -> &'static str;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Singleton> ErasedLifecycle for Lifecycle<T> {
    fn is_initialized(&self) -> bool {
        Lifecycle::is_initialized(self)
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Registry of singleton instances keyed by type.
///
/// Instances are constructed lazily, at most once per type, on the first
/// call to [`instance`](Self::instance). The registry lock is only held to
/// find or create a type's [`Lifecycle`]; construction runs outside it, so
/// a singleton may depend on other singletons.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_lifecycle::{ConfigRegistry, Context};
///
/// let ctx = Context::new();
/// let a = ctx.instance::<ConfigRegistry>();
/// let b = ctx.instance::<ConfigRegistry>();
///
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(ctx.constructions::<ConfigRegistry>(), 1);
/// ```
#[derive(Default)]
pub struct Context {
    lifecycles: RwLock<HashMap<TypeId, Arc<dyn ErasedLifecycle>>>,
}

impl Context {
    /// Creates an empty context, isolated from every other context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide context.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use custodian_lifecycle::{ConfigRegistry, Context};
    ///
    /// let a = Context::global().instance::<ConfigRegistry>();
    /// let b = Context::global().instance::<ConfigRegistry>();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    #[must_use]
    pub fn global() -> &'static Arc<Context> {
        &GLOBAL
    }

    /// Returns the instance of `T`, constructing it on first request.
    pub fn instance<T: Singleton>(&self) -> Arc<T> {
        let lifecycle = self.lifecycle::<T>();
        if let Some(value) = lifecycle.get() {
            tracing::debug!(singleton = core::any::type_name::<T>(), "reusing instance");
            return value;
        }
        lifecycle.instance(|| {
            tracing::info!(singleton = core::any::type_name::<T>(), "constructing instance");
            T::construct(self)
        })
    }

    /// Returns the instance of `T` if it exists. Never constructs.
    #[must_use]
    pub fn get<T: Singleton>(&self) -> Option<Arc<T>> {
        self.existing::<T>().and_then(|lifecycle| lifecycle.get())
    }

    /// Returns `true` if `T` has been constructed in this context.
    #[must_use]
    pub fn contains<T: Singleton>(&self) -> bool {
        self.existing::<T>()
            .is_some_and(|lifecycle| lifecycle.is_initialized())
    }

    /// Returns how many times `T` has been constructed (0 or 1).
    #[must_use]
    pub fn constructions<T: Singleton>(&self) -> usize {
        self.existing::<T>()
            .map_or(0, |lifecycle| lifecycle.constructions())
    }

    /// Returns the number of constructed singletons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lifecycles
            .read()
            .values()
            .filter(|lifecycle| lifecycle.is_initialized())
            .count()
    }

    /// Returns `true` if no singleton has been constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type names of the constructed singletons, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .lifecycles
            .read()
            .values()
            .filter(|lifecycle| lifecycle.is_initialized())
            .map(|lifecycle| lifecycle.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    fn existing<T: Singleton>(&self) -> Option<Arc<Lifecycle<T>>> {
        self.lifecycles
            .read()
            .get(&TypeId::of::<T>())
            .map(|erased| downcast::<T>(Arc::clone(erased)))
    }

    fn lifecycle<T: Singleton>(&self) -> Arc<Lifecycle<T>> {
        if let Some(lifecycle) = self.existing::<T>() {
            return lifecycle;
        }

        let mut lifecycles = self.lifecycles.write();
        let erased = lifecycles
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(Lifecycle::<T>::new()) as Arc<dyn ErasedLifecycle>);
        downcast::<T>(Arc::clone(erased))
    }
}

fn downcast<T: Singleton>(erased: Arc<dyn ErasedLifecycle>) -> Arc<Lifecycle<T>> {
    erased
        .into_any()
        .downcast::<Lifecycle<T>>()
        .unwrap_or_else(|_| unreachable!("lifecycle type mismatch (this is a bug)"))
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("singletons", &self.type_names())
            .finish()
    }
}
