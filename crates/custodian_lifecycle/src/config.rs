//! Application configuration singleton.

use crate::context::{Context, Singleton};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Default connection string for the application database.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost:5432/myapp";

/// Settings loaded into every fresh [`ConfigRegistry`], in load order.
pub const DEFAULT_SETTINGS: [(&str, &str); 5] = [
    ("database_url", DEFAULT_DATABASE_URL),
    ("api_key", "sk-1234567890abcdef"),
    ("max_connections", "100"),
    ("timeout", "30000"),
    ("environment", "production"),
];

/// Process-wide key/value settings.
///
/// Defaults are loaded once, when the registry is constructed. Values can
/// be overridden or added with [`set`](Self::set); [`snapshot`](Self::snapshot)
/// lists settings in the order they were first inserted.
///
/// # Example
///
/// ```
/// use custodian_lifecycle::{ConfigRegistry, Context};
///
/// let ctx = Context::new();
/// ctx.instance::<ConfigRegistry>().set("new_feature", "enabled");
///
/// let config = ctx.instance::<ConfigRegistry>();
/// assert_eq!(config.get("new_feature").as_deref(), Some("enabled"));
/// assert_eq!(config.get("environment").as_deref(), Some("production"));
/// assert_eq!(config.load_count(), 1);
/// ```
pub struct ConfigRegistry {
    settings: RwLock<IndexMap<String, String>>,
    loads: AtomicUsize,
}

impl Singleton for ConfigRegistry {
    fn construct(_ctx: &Context) -> Self {
        Self::new()
    }
}

impl ConfigRegistry {
    /// Builds a registry holding the defaults. Reached through
    /// [`Singleton::construct`] only.
    pub(crate) fn new() -> Self {
        Self {
            settings: RwLock::new(Self::load_defaults()),
            loads: AtomicUsize::new(1),
        }
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.settings.read().get(key).cloned()
    }

    /// Sets `key` to `value`, keeping the key's original position if it
    /// already exists.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        tracing::info!(%key, %value, "configuration updated");
        self.settings.write().insert(key, value);
    }

    /// Returns every setting in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.settings.read().clone()
    }

    /// Returns the number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.read().len()
    }

    /// Returns `true` if no settings are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.read().is_empty()
    }

    /// Discards every setting and loads the defaults again.
    ///
    /// The fresh settings replace the old ones in a single write, so readers
    /// see either the previous settings or the defaults, never a partial map.
    pub fn reload(&self) {
        let fresh = Self::load_defaults();
        let mut settings = self.settings.write();
        *settings = fresh;
        self.loads.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns how many times defaults have been loaded into this registry.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    fn load_defaults() -> IndexMap<String, String> {
        tracing::debug!(count = DEFAULT_SETTINGS.len(), "loading default configuration");
        DEFAULT_SETTINGS
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("keys", &self.settings.read().keys().collect::<Vec<_>>())
            .field("loads", &self.load_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loaded_in_order() {
        let config = ConfigRegistry::new();
        let keys: Vec<_> = config.snapshot().into_keys().collect();

        assert_eq!(
            keys,
            ["database_url", "api_key", "max_connections", "timeout", "environment"]
        );
        assert_eq!(config.get("api_key").as_deref(), Some("sk-1234567890abcdef"));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn set_appends_new_keys_and_keeps_position_of_old() {
        let config = ConfigRegistry::new();
        config.set("new_feature", "enabled");
        config.set("timeout", "5000");

        let snapshot = config.snapshot();
        assert_eq!(snapshot.get_index_of("timeout"), Some(3));
        assert_eq!(snapshot.get_index_of("new_feature"), Some(5));
        assert_eq!(snapshot["timeout"], "5000");
        assert_eq!(config.len(), 6);
    }

    #[test]
    fn reload_restores_defaults() {
        let config = ConfigRegistry::new();
        config.set("new_feature", "enabled");
        config.reload();

        assert_eq!(config.get("new_feature"), None);
        assert_eq!(config.len(), DEFAULT_SETTINGS.len());
        assert_eq!(config.load_count(), 2);
    }

    #[test]
    fn reload_never_exposes_an_empty_registry() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicBool;
        use std::thread;

        let config = Arc::new(ConfigRegistry::new());
        let done = Arc::new(AtomicBool::new(false));

        let reloader = {
            let config = Arc::clone(&config);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                loop {
                    config.reload();
                    if done.load(Ordering::Acquire) {
                        break;
                    }
                }
            })
        };

        let missing = (0..50_000)
            .filter(|_| config.get("database_url").is_none())
            .count();
        done.store(true, Ordering::Release);
        reloader.join().expect("Thread panicked");

        assert_eq!(missing, 0);
        assert!(config.load_count() > 1);
    }
}
