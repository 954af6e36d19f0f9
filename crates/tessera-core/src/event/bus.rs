// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// An event that can travel over an [`EventBus`].
///
/// Events are immutable tagged values; `kind()` returns the discriminant
/// handlers subscribe to.
pub trait BusEvent: Clone + fmt::Debug + Send + Sync + 'static {
    /// The discriminant type handlers are keyed by.
    type Kind: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Returns this event's discriminant.
    fn kind(&self) -> Self::Kind;
}

/// A subscribed callback. Identity is the `Arc` allocation: subscribing the
/// same `Arc` twice for the same kind registers it once.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

type HandlerMap<E> = HashMap<<E as BusEvent>::Kind, Vec<Handler<E>>>;

struct BusInner<E: BusEvent> {
    handlers: Mutex<HandlerMap<E>>,
    outbox: Option<(flume::Sender<E>, flume::Receiver<E>)>,
}

impl<E: BusEvent> BusInner<E> {
    fn handlers(&self) -> MutexGuard<'_, HandlerMap<E>> {
        // Handlers run outside the lock, so a poisoned map is still consistent.
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn same_handler<E>(a: &Handler<E>, b: &Handler<E>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// A synchronous, typed publish/subscribe channel.
///
/// `emit` invokes every handler subscribed to the event's kind before it
/// returns, iterating over a snapshot of the subscriber list taken at emit
/// time: handlers may subscribe or unsubscribe during dispatch, and those
/// changes only affect later emits.
///
/// Cloning the bus yields another handle to the same subscriber table.
///
/// A bus created with [`EventBus::with_outbox`] additionally records every
/// emitted event in an unbounded channel, which the engine drains to fan
/// events out to module `on_event` hooks.
pub struct EventBus<E: BusEvent> {
    inner: Arc<BusInner<E>>,
}

impl<E: BusEvent> EventBus<E> {
    /// Creates a bus without an outbox.
    pub fn new() -> Self {
        log::debug!("EventBus<{}> initialized.", std::any::type_name::<E>());
        Self {
            inner: Arc::new(BusInner {
                handlers: Mutex::new(HashMap::new()),
                outbox: None,
            }),
        }
    }

    /// Creates a bus that also records every emitted event for later draining.
    pub fn with_outbox() -> Self {
        log::debug!(
            "EventBus<{}> initialized with outbox.",
            std::any::type_name::<E>()
        );
        Self {
            inner: Arc::new(BusInner {
                handlers: Mutex::new(HashMap::new()),
                outbox: Some(flume::unbounded()),
            }),
        }
    }

    /// Subscribes `handler` to events of `kind`.
    ///
    /// Subscribing the identical handler twice for the same kind is a no-op;
    /// both returned subscriptions then refer to the one registration.
    pub fn on(&self, kind: E::Kind, handler: Handler<E>) -> Subscription {
        {
            let mut handlers = self.inner.handlers();
            let list = handlers.entry(kind.clone()).or_default();
            if list.iter().any(|h| same_handler(h, &handler)) {
                log::trace!("Handler already subscribed to {kind:?}; ignoring duplicate.");
            } else {
                list.push(handler.clone());
            }
        }

        let weak: Weak<BusInner<E>> = Arc::downgrade(&self.inner);
        Subscription {
            detach: Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let mut handlers = inner.handlers();
                if let Some(list) = handlers.get_mut(&kind) {
                    list.retain(|h| !same_handler(h, &handler));
                    if list.is_empty() {
                        handlers.remove(&kind);
                    }
                }
            }),
        }
    }

    /// Convenience wrapper around [`on`](Self::on) for a fresh closure.
    pub fn on_fn<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on(kind, Arc::new(handler))
    }

    /// Synchronously dispatches `event` to every handler subscribed to its kind.
    pub fn emit(&self, event: &E) {
        let kind = event.kind();
        let snapshot: Vec<Handler<E>> = self
            .inner
            .handlers()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        if let Some((sender, _)) = &self.inner.outbox {
            // The receiver lives in the same `BusInner`, so this cannot disconnect.
            if let Err(e) = sender.send(event.clone()) {
                log::error!("Failed to record event in outbox: {e}.");
            }
        }

        log::trace!("Emitting {kind:?} to {} handler(s).", snapshot.len());
        for handler in snapshot {
            handler(event);
        }
    }

    /// Removes and returns every event recorded since the last drain, oldest first.
    ///
    /// Always empty for a bus created without an outbox.
    pub fn drain_outbox(&self) -> Vec<E> {
        match &self.inner.outbox {
            Some((_, receiver)) => receiver.try_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Returns the number of handlers currently subscribed to `kind`.
    pub fn subscriber_count(&self, kind: &E::Kind) -> usize {
        self.inner.handlers().get(kind).map_or(0, Vec::len)
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.inner.handlers().clear();
    }
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds = self.inner.handlers().len();
        f.debug_struct("EventBus")
            .field("kinds", &kinds)
            .field("outbox", &self.inner.outbox.is_some())
            .finish()
    }
}

/// A handle to one subscription, returned by [`EventBus::on`].
///
/// Dropping the handle does **not** unsubscribe; call
/// [`unsubscribe`](Subscription::unsubscribe), which is safe to call any
/// number of times.
#[must_use = "keep the Subscription to be able to unsubscribe later"]
pub struct Subscription {
    detach: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Removes the handler from the bus. Further calls do nothing.
    pub fn unsubscribe(&self) {
        (self.detach)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
