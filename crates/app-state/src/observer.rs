//! Typed publish/subscribe with explicit cancellation
//!
//! [`Observable`] is the notification primitive shared by the state store and
//! the router. Listeners are invoked synchronously, in registration order, on
//! the thread that performed the mutation.
//!
//! # Delivery order
//!
//! An emission requested from inside a listener is queued and delivered once
//! the in-flight emission has reached every listener. Every listener therefore
//! observes values in the order they were emitted, and a listener that reacts
//! to a value by emitting another one never recurses into itself.
//!
//! # Cancellation
//!
//! [`Observable::subscribe`] returns a [`Subscription`]. Dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the listener, so a component that owns
//! its subscriptions cannot leak them on any exit path.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

/// Listener callback type
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifier assigned to each registered listener
type ListenerId = u64;

struct Registry<T> {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Listener<T>)>,
    pending: VecDeque<T>,
    emitting: bool,
}

impl<T> Registry<T> {
    fn listener(&self, id: ListenerId) -> Option<Listener<T>> {
        self.listeners
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, listener)| Arc::clone(listener))
    }
}

/// A value stream with synchronous, ordered delivery to subscribers
pub struct Observable<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
                pending: VecDeque::new(),
                emitting: false,
            })),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Observable")
            .field("listeners", &registry.listeners.len())
            .field("pending", &registry.pending.len())
            .field("emitting", &registry.emitting)
            .finish()
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Create an observable with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .listeners
                    .retain(|(candidate, _)| *candidate != id);
            }
        })
    }

    /// Deliver a value to every registered listener
    ///
    /// If called while an emission is already in progress the value is
    /// queued behind it and this call returns immediately.
    pub fn emit(&self, value: T) {
        {
            let mut registry = self.registry.lock();
            registry.pending.push_back(value);
            if registry.emitting {
                return;
            }
            registry.emitting = true;
        }

        let _reset = EmitReset {
            registry: &self.registry,
        };

        loop {
            let (value, ids) = {
                let mut registry = self.registry.lock();
                match registry.pending.pop_front() {
                    Some(value) => {
                        let ids: Vec<ListenerId> =
                            registry.listeners.iter().map(|(id, _)| *id).collect();
                        (value, ids)
                    }
                    None => {
                        registry.emitting = false;
                        break;
                    }
                }
            };

            for id in ids {
                // A listener removed by an earlier listener in this round is skipped.
                let listener = self.registry.lock().listener(id);
                if let Some(listener) = listener {
                    listener(&value);
                }
            }
        }
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

/// Releases the emitting flag when a listener panics
///
/// On normal exit the flag is cleared under the same lock that observed the
/// empty queue, so a value queued by another thread is never discarded.
struct EmitReset<'a, T> {
    registry: &'a Mutex<Registry<T>>,
}

impl<T> Drop for EmitReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut registry = self.registry.lock();
            registry.emitting = false;
            registry.pending.clear();
        }
    }
}

/// Cancellation token for a registered listener
#[must_use = "dropping a Subscription immediately unsubscribes its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
