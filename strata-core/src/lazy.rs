use std::sync::{Mutex, OnceLock, PoisonError};

type Loader<T> = Box<dyn FnOnce() -> T + Send>;

/// A thread-safe, memoized lazy value.
///
/// Holds either "unforced" (a stored one-shot loader) or "forced" (a cached
/// result). Forcing is idempotent: the first caller runs the loader, every
/// later caller (concurrent or sequential) observes the same cached value
/// and the loader never runs again.
///
/// # Example
///
/// ```
/// use strata_core::Lazy;
///
/// let cell = Lazy::new(|| 21 * 2);
/// assert!(!cell.is_forced());
/// assert_eq!(*cell.force(), 42);
/// assert_eq!(*cell.force(), 42);
/// ```
pub struct Lazy<T> {
    cell: OnceLock<T>,
    loader: Mutex<Option<Loader<T>>>,
}

impl<T> Lazy<T> {
    pub fn new(loader: impl FnOnce() -> T + Send + 'static) -> Self {
        Self {
            cell: OnceLock::new(),
            loader: Mutex::new(Some(Box::new(loader))),
        }
    }

    /// A cell that is already forced to `value`.
    pub fn ready(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self {
            cell,
            loader: Mutex::new(None),
        }
    }

    /// Run the loader if this cell is still unforced, then return the
    /// cached value.
    ///
    /// A loader that panics leaves the cell permanently unforceable; the
    /// panic propagates to the forcing caller.
    pub fn force(&self) -> &T {
        self.cell.get_or_init(|| {
            let loader = self
                .loader
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match loader {
                Some(load) => load(),
                None => unreachable!("lazy loader consumed without initializing the cell"),
            }
        })
    }

    pub fn is_forced(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The cached value, without forcing.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Lazy").field(value).finish(),
            None => f.write_str("Lazy(<unforced>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn forces_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cell = Lazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "loaded"
        });
        assert_eq!(*cell.force(), "loaded");
        assert_eq!(*cell.force(), "loaded");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ready_never_runs_a_loader() {
        let cell = Lazy::ready(7);
        assert!(cell.is_forced());
        assert_eq!(*cell.force(), 7);
    }

    #[test]
    fn concurrent_forcing_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cell = Arc::new(Lazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            42u64
        }));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                std::thread::spawn(move || *cell.force())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
