// Rust guideline compliant 2026-10-18

//! Output-tracking event bus.
//!
//! Each collaborator owns one [`EventBus`] typed by its own closed event enum
//! and publishes to it after an effect (real or simulated) has completed.
//! Tests attach an [`OutputTracker`] to assert on what happened instead of on
//! how the collaborator was called.
//!
//! Dispatch is synchronous: every listener runs on the publishing task before
//! [`EventBus::publish`] returns.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

/// A subscriber callback. Identity is the `Arc` allocation, so the same
/// listener must be passed to [`EventBus::unsubscribe`] to remove it.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

type Listeners<E> = Arc<Mutex<Vec<Listener<E>>>>;

/// Typed event published by a collaborator.
pub trait Event: fmt::Debug {
    /// Stable tag identifying the payload shape (e.g. `"mail_sent"`).
    fn kind(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Synchronous publish/subscribe channel scoped to one collaborator instance.
pub struct EventBus<E> {
    listeners: Listeners<E>,
}

impl<E> EventBus<E> {
    /// Create a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self { listeners: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Register `listener`. Registering an already subscribed listener is a no-op.
    pub fn subscribe(&self, listener: &Listener<E>) {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|l| same_listener(l, listener)) {
            return;
        }
        listeners.push(Arc::clone(listener));
    }

    /// Remove `listener`; unknown listeners are ignored.
    pub fn unsubscribe(&self, listener: &Listener<E>) {
        remove_listener(&self.listeners, listener);
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<E: Event> EventBus<E> {
    /// Call every registered listener with `event`, in subscription order.
    ///
    /// The listener list is copied before dispatch, so listeners may
    /// subscribe or unsubscribe while being called. A panicking listener is
    /// logged and skipped; the remaining listeners still run.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self.listeners.lock().iter().map(Arc::clone).collect();
        tracing::trace!(kind = event.kind(), listeners = snapshot.len(), "event_bus.publish");
        for listener in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::warn!(kind = event.kind(), "event_bus.listener_panicked");
            }
        }
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// Start recording every event published from now on.
    #[must_use]
    pub fn track(&self) -> OutputTracker<E> {
        let recorded: Arc<Mutex<Vec<E>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&recorded);
        let listener: Listener<E> = Arc::new(move |event: &E| sink.lock().push(event.clone()));
        self.subscribe(&listener);
        OutputTracker {
            recorded,
            listener,
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listener_count()).finish()
    }
}

// ---------------------------------------------------------------------------
// OutputTracker
// ---------------------------------------------------------------------------

/// Records events published on an [`EventBus`] until stopped or dropped.
pub struct OutputTracker<E> {
    recorded: Arc<Mutex<Vec<E>>>,
    listener: Listener<E>,
    listeners: Listeners<E>,
}

impl<E> OutputTracker<E> {
    /// Return the events recorded since the last call and clear the record.
    #[must_use]
    pub fn data(&self) -> Vec<E> {
        std::mem::take(&mut *self.recorded.lock())
    }

    /// Stop recording. Already recorded events stay available via [`data`](Self::data).
    pub fn stop(&self) {
        remove_listener(&self.listeners, &self.listener);
    }
}

impl<E> Drop for OutputTracker<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<E> fmt::Debug for OutputTracker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputTracker").field("recorded", &self.recorded.lock().len()).finish()
    }
}

fn remove_listener<E>(listeners: &Listeners<E>, listener: &Listener<E>) {
    listeners.lock().retain(|l| !same_listener(l, listener));
}

// Compare data pointers only; vtable pointers are not guaranteed unique.
fn same_listener<E>(a: &Listener<E>, b: &Listener<E>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
