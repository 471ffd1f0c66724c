//! Change notification plumbing.
//!
//! Consumers subscribe with a callback and receive an explicit
//! [`Subscription`] handle; dropping the handle does *not* detach the
//! callback; cleanup is an explicit [`Subscription::unsubscribe`], so
//! subscriptions survive being moved around without surprise detachment.
//!
//! Emission is re-entrancy safe: a callback may subscribe or unsubscribe
//! (including itself) during an emit without corrupting the callback table.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<T> = Box<dyn FnMut(&T) + Send>;

struct EmitterInner<T> {
    next_id: u64,
    callbacks: HashMap<u64, Callback<T>>,
    /// Ids unsubscribed while their callback was checked out by an emit.
    removed: HashSet<u64>,
    emit_depth: usize,
}

/// A multi-subscriber event channel.
pub struct EventEmitter<T> {
    inner: Arc<Mutex<EmitterInner<T>>>,
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> EventEmitter<T> {
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EmitterInner {
                next_id: 0,
                callbacks: HashMap::new(),
                removed: HashSet::new(),
                emit_depth: 0,
            })),
        }
    }

    /// Register a callback; returns the handle that detaches it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
        T: 'static,
    {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.callbacks.insert(id, Box::new(callback));
            id
        };

        let weak: Weak<Mutex<EmitterInner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.lock();
                    if inner.callbacks.remove(&id).is_none() && inner.emit_depth > 0 {
                        inner.removed.insert(id);
                    }
                }
            })),
        }
    }

    /// Invoke every registered callback with `value`.
    ///
    /// Callbacks run outside the emitter lock; subscriptions added during
    /// emission are not invoked for the in-flight event.
    pub fn emit(&self, value: &T) {
        let mut checked_out = {
            let mut inner = self.inner.lock();
            inner.emit_depth += 1;
            std::mem::take(&mut inner.callbacks)
        };

        for callback in checked_out.values_mut() {
            callback(value);
        }

        let mut inner = self.inner.lock();
        inner.emit_depth -= 1;
        for (id, callback) in checked_out {
            if !inner.removed.contains(&id) {
                inner.callbacks.entry(id).or_insert(callback);
            }
        }
        if inner.emit_depth == 0 {
            inner.removed.clear();
        }
    }

    /// Number of attached callbacks. Primarily for tests.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().callbacks.len()
    }
}

/// Handle detaching one subscribed callback.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Detach the callback. Idempotent by construction (consumes `self`).
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
