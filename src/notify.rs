//! Change notification - observers keyed by content URI
//!
//! A change to `content://a/friends/3` reaches:
//! - observers registered on exactly that URI
//! - observers on an ancestor (e.g. `content://a/friends`) that asked for descendants
//! - observers on any descendant of the changed URI

use crate::uri::ContentUri;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// One delivered change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub uri: ContentUri,
}

struct Registration {
    uri: ContentUri,
    notify_for_descendants: bool,
    tx: Sender<ChangeEvent>,
    alive: Weak<()>,
}

impl Registration {
    fn is_live(&self) -> bool {
        self.alive.strong_count() > 0
    }

    fn wants(&self, changed: &ContentUri) -> bool {
        self.uri == *changed
            || (self.notify_for_descendants && changed.is_descendant_of(&self.uri))
            || self.uri.is_descendant_of(changed)
    }
}

/// Shared registry of change observers.
///
/// Clones share the same observer list, so the provider and any number of
/// subscribers can hold a handle.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    observers: Arc<Mutex<Vec<Registration>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        // a panicking observer cannot leave the list half-updated
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start observing `uri`. Dropping the returned observer unregisters it.
    pub fn register(&self, uri: ContentUri, notify_for_descendants: bool) -> ChangeObserver {
        let (tx, rx) = channel::unbounded();
        let token = Arc::new(());
        tracing::debug!(%uri, notify_for_descendants, "Registered change observer");
        self.lock().push(Registration {
            uri,
            notify_for_descendants,
            tx,
            alive: Arc::downgrade(&token),
        });
        ChangeObserver { rx, _token: token }
    }

    /// Deliver a change to every interested observer.
    ///
    /// Returns how many observers were notified.
    pub fn notify_change(&self, uri: &ContentUri) -> usize {
        let mut observers = self.lock();
        let mut delivered = 0;
        observers.retain(|registration| {
            if !registration.is_live() {
                return false;
            }
            if !registration.wants(uri) {
                return true;
            }
            match registration.tx.send(ChangeEvent { uri: uri.clone() }) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                // receiver dropped
                Err(_) => false,
            }
        });

        tracing::debug!(%uri, delivered, "Change notified");
        delivered
    }

    /// Number of live registrations
    pub fn observer_count(&self) -> usize {
        let mut observers = self.lock();
        observers.retain(Registration::is_live);
        observers.len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.lock().len())
            .finish()
    }
}

/// Receiving end of a registration.
#[derive(Debug)]
pub struct ChangeObserver {
    rx: Receiver<ChangeEvent>,
    _token: Arc<()>,
}

impl ChangeObserver {
    /// Next pending change, without blocking
    pub fn try_recv(&self) -> Option<ChangeEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next change
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ChangeEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All pending changes
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }
}
