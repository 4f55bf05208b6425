//! Application state.

use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, lockable application state.
///
/// The host only touches the state through [`Store::read`] and [`Store::write`], so other threads
/// (an audio thread, a file watcher) can hold a clone and update the state between frames.
pub struct Store<S> {
    inner: Arc<RwLock<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Store<S> {
    pub fn new(state: S) -> Store<S> {
        Store {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Runs `f` with shared access to the state.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access to the state.
    pub fn write<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[test]
fn test_clones_share_state() {
    let store = Store::new(vec![1, 2]);
    let other = store.clone();
    other.write(|state| state.push(3));
    assert_eq!(store.read(|state| state.len()), 3);
}
