//! The expensive-resource contract and a simulated image loader.

use crate::error::ConstructionError;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;

/// An expensive, fully constructed resource.
pub trait Asset: Send + Sync + 'static {
    /// Returns the resource identifier.
    fn identifier(&self) -> &str;

    /// Returns the resource size in kilobytes.
    fn size(&self) -> u64;

    /// Presents the resource and returns what was shown.
    fn display(&self) -> String;
}

/// Constructs assets from identifiers.
///
/// Loading may block (disk, network, decoding). Mediators impose no timeout
/// and offer no cancellation: a load is either in flight or finished.
pub trait Loader: Send + Sync + 'static {
    /// The asset type this loader produces.
    type Asset: Asset;

    /// Loads the asset named by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] if the asset cannot be produced.
    fn load(&self, identifier: &str) -> Result<Self::Asset, ConstructionError>;
}

/// A loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    identifier: String,
    size: u64,
    data: String,
}

impl Image {
    /// Returns the decoded image payload.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl Asset for Image {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn display(&self) -> String {
        format!("Displaying image: {}", self.identifier)
    }
}

/// Default time a simulated load takes.
pub const DEFAULT_LOAD_LATENCY: Duration = Duration::from_millis(100);

/// Loader that fabricates [`Image`]s after a fixed delay.
///
/// Sizes are derived from the identifier, so the same identifier always
/// loads to the same size, in the range `500..1500` KB. The loader counts
/// attempts and successful loads, and can be told to fail its first `n`
/// attempts.
///
/// # Example
///
/// ```
/// use custodian_mediator::{Asset, Loader, SimulatedLoader};
///
/// let loader = SimulatedLoader::instant();
/// let image = loader.load("photo1.jpg").unwrap();
///
/// assert_eq!(image.identifier(), "photo1.jpg");
/// assert!((500..1500).contains(&image.size()));
/// assert_eq!(loader.loads(), 1);
/// ```
#[derive(Debug)]
pub struct SimulatedLoader {
    latency: Duration,
    failures_remaining: AtomicUsize,
    attempts: AtomicUsize,
    loads: AtomicUsize,
}

impl Default for SimulatedLoader {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LOAD_LATENCY,
            failures_remaining: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        }
    }
}

impl SimulatedLoader {
    /// Creates a loader with the default latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that does not sleep.
    #[must_use]
    pub fn instant() -> Self {
        Self::default().with_latency(Duration::ZERO)
    }

    /// Sets how long each load blocks.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes the next `count` loads fail.
    #[must_use]
    pub fn with_failures(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Returns the number of load attempts, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Returns the number of successful loads.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Loader for SimulatedLoader {
    type Asset = Image;

    fn load(&self, identifier: &str) -> Result<Image, ConstructionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(identifier, latency = ?self.latency, "loading image");

        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        if self.take_failure() {
            tracing::warn!(identifier, "simulated load failure");
            return Err(ConstructionError::new(identifier, "simulated I/O failure"));
        }

        let size = simulated_size(identifier);
        self.loads.fetch_add(1, Ordering::SeqCst);
        tracing::info!(identifier, size_kb = size, "image loaded");

        Ok(Image {
            identifier: identifier.to_string(),
            size,
            data: format!("[Image data for {identifier}]"),
        })
    }
}

fn simulated_size(identifier: &str) -> u64 {
    let hash = identifier
        .bytes()
        .fold(0_u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    500 + hash % 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_deterministic_and_bounded() {
        let loader = SimulatedLoader::instant();
        let a = loader.load("large_image.jpg").unwrap();
        let b = loader.load("large_image.jpg").unwrap();

        assert_eq!(a.size(), b.size());
        assert!((500..1500).contains(&a.size()));
        assert_eq!(a.data(), "[Image data for large_image.jpg]");
    }

    #[test]
    fn configured_failures_come_first() {
        let loader = SimulatedLoader::instant().with_failures(2);

        assert!(loader.load("x.jpg").is_err());
        assert!(loader.load("x.jpg").is_err());
        assert!(loader.load("x.jpg").is_ok());

        assert_eq!(loader.attempts(), 3);
        assert_eq!(loader.loads(), 1);
    }

    #[test]
    fn display_names_the_image() {
        let image = SimulatedLoader::instant().load("photo1.jpg").unwrap();
        assert_eq!(image.display(), "Displaying image: photo1.jpg");
    }
}
