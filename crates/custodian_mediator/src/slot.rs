//! One-shot construction slot.
//!
//! A [`Slot`] moves through three phases and never goes back once it has
//! reached [`Phase::Constructed`]:
//!
//! ```text
//! Unconstructed ──▶ Constructing ──▶ Constructed
//!       ▲                 │
//!       └──── failure ────┘
//! ```
//!
//! The initializer runs without the slot's lock held, so construction may
//! block for as long as it needs. Callers arriving while another thread is
//! constructing wait for the outcome instead of starting a second
//! construction.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Observable lifecycle phase of a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No value exists and no construction is running.
    Unconstructed,
    /// A construction is in flight.
    Constructing,
    /// The value exists and will be reused for the life of the slot.
    Constructed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconstructed => "unconstructed",
            Self::Constructing => "constructing",
            Self::Constructed => "constructed",
        };
        f.write_str(name)
    }
}

enum State<T> {
    Unconstructed,
    Constructing,
    Constructed(Arc<T>),
}

impl<T> State<T> {
    fn phase(&self) -> Phase {
        match self {
            Self::Unconstructed => Phase::Unconstructed,
            Self::Constructing => Phase::Constructing,
            Self::Constructed(_) => Phase::Constructed,
        }
    }
}

/// A thread-safe holder that constructs its value at most once.
///
/// # Example
///
/// ```
/// use custodian_mediator::{Phase, Slot};
///
/// let slot = Slot::new();
/// assert_eq!(slot.phase(), Phase::Unconstructed);
///
/// let value = slot.get_or_try_init(|| Ok::<_, ()>(42)).unwrap();
/// assert_eq!(*value, 42);
///
/// // The initializer is not run again.
/// let again = slot.get_or_try_init(|| Ok::<_, ()>(0)).unwrap();
/// assert_eq!(*again, 42);
/// assert_eq!(slot.constructions(), 1);
/// ```
pub struct Slot<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
    constructions: AtomicUsize,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::Unconstructed),
            ready: Condvar::new(),
            constructions: AtomicUsize::new(0),
        }
    }
}

impl<T> Slot<T> {
    /// Creates an unconstructed slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    /// Returns the value if it has been constructed. Never constructs.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            State::Constructed(value) => Some(Arc::clone(value)),
            State::Unconstructed | State::Constructing => None,
        }
    }

    /// Returns the number of successful constructions (0 or 1).
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }

    /// Returns the value, constructing it with `init` if needed.
    ///
    /// If another caller is already constructing, this waits for that
    /// construction to finish. If `init` fails (or panics), the slot returns
    /// to [`Phase::Unconstructed`] and a later call may retry.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `init`.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut state = self.state.lock();
        loop {
            if let State::Constructed(value) = &*state {
                return Ok(Arc::clone(value));
            }
            if matches!(*state, State::Unconstructed) {
                break;
            }
            self.ready.wait(&mut state);
        }
        *state = State::Constructing;
        drop(state);

        let guard = ConstructingGuard { slot: self };
        let result = init();
        core::mem::forget(guard);

        let mut state = self.state.lock();
        let outcome = match result {
            Ok(value) => {
                let value = Arc::new(value);
                *state = State::Constructed(Arc::clone(&value));
                self.constructions.fetch_add(1, Ordering::AcqRel);
                Ok(value)
            }
            Err(err) => {
                *state = State::Unconstructed;
                Err(err)
            }
        };
        drop(state);
        self.ready.notify_all();
        outcome
    }

    /// Stores an already-built value.
    ///
    /// # Errors
    ///
    /// Returns the value back if the slot is constructing or constructed.
    pub fn install(&self, value: T) -> Result<Arc<T>, T> {
        let mut state = self.state.lock();
        if !matches!(*state, State::Unconstructed) {
            return Err(value);
        }
        let value = Arc::new(value);
        *state = State::Constructed(Arc::clone(&value));
        self.constructions.fetch_add(1, Ordering::AcqRel);
        drop(state);
        self.ready.notify_all();
        Ok(value)
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("phase", &self.phase())
            .field("constructions", &self.constructions())
            .finish()
    }
}

/// Resets an in-flight construction if the initializer unwinds.
struct ConstructingGuard<'a, T> {
    slot: &'a Slot<T>,
}

impl<T> Drop for ConstructingGuard<'_, T> {
    fn drop(&mut self) {
        *self.slot.state.lock() = State::Unconstructed;
        self.slot.ready.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn starts_unconstructed() {
        let slot = Slot::<u32>::new();
        assert_eq!(slot.phase(), Phase::Unconstructed);
        assert!(slot.get().is_none());
        assert_eq!(slot.constructions(), 0);
    }

    #[test]
    fn failure_returns_to_unconstructed() {
        let slot = Slot::<u32>::new();

        let result = slot.get_or_try_init(|| Err("disk offline"));
        assert_eq!(result.unwrap_err(), "disk offline");
        assert_eq!(slot.phase(), Phase::Unconstructed);

        let value = slot.get_or_try_init(|| Ok::<_, &str>(7)).unwrap();
        assert_eq!(*value, 7);
        assert_eq!(slot.phase(), Phase::Constructed);
        assert_eq!(slot.constructions(), 1);
    }

    #[test]
    fn panic_in_init_does_not_poison() {
        let slot = Arc::new(Slot::<u32>::new());

        let panicking = Arc::clone(&slot);
        let result = thread::spawn(move || {
            let _ = panicking.get_or_try_init(|| -> Result<u32, ()> { panic!("boom") });
        })
        .join();
        assert!(result.is_err());

        assert_eq!(slot.phase(), Phase::Unconstructed);
        assert_eq!(*slot.get_or_try_init(|| Ok::<_, ()>(3)).unwrap(), 3);
    }

    #[test]
    fn install_rejects_second_value() {
        let slot = Slot::new();
        assert!(slot.install(1).is_ok());
        assert_eq!(slot.install(2), Err(2));
        assert_eq!(*slot.get().unwrap(), 1);
    }

    #[test]
    fn racing_callers_share_one_construction() {
        let slot = Arc::new(Slot::<usize>::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(6));

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let slot = Arc::clone(&slot);
                let runs = Arc::clone(&runs);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    slot.get_or_try_init(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(core::time::Duration::from_millis(20));
                        Ok::<_, ()>(i)
                    })
                    .unwrap()
                })
            })
            .collect();

        let values: Vec<Arc<usize>> = handles
            .into_iter()
            .map(|h| h.join().expect("Thread panicked"))
            .collect();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }
}
