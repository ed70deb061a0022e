//! Synchronous, type-keyed publish/subscribe router.
//!
//! The dispatcher keeps an ordered subscriber list per event kind:
//!
//! - **Registration order** is invocation order.
//! - **Duplicates are kept**: subscribing the same handle twice delivers twice.
//! - **Unsubscribe is by identity**: every occurrence of the handle is removed.
//!
//! `publish` snapshots the subscriber list and releases the registry lock before
//! invoking anyone, so subscribers may publish, subscribe or unsubscribe while
//! being dispatched to. Registry changes made mid-dispatch apply from the next
//! `publish` on.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use vendnet_core::DomainError;

use crate::{Event, SharedSubscriber};

/// A subscriber rejected an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("subscriber `{subscriber}` failed while handling {event_type}: {source}")]
    Subscriber {
        event_type: &'static str,
        subscriber: &'static str,
        #[source]
        source: DomainError,
    },
}

impl DispatchError {
    /// The domain failure that aborted dispatch.
    pub fn domain_error(&self) -> &DomainError {
        match self {
            DispatchError::Subscriber { source, .. } => source,
        }
    }
}

/// Lets a subscriber propagate a nested `publish` failure with `?`.
///
/// The inner event type and subscriber name are logged here; the returned
/// `DomainError` only carries the root cause.
impl From<DispatchError> for DomainError {
    fn from(value: DispatchError) -> Self {
        tracing::warn!(error = %value, "nested dispatch failed");
        match value {
            DispatchError::Subscriber { source, .. } => source,
        }
    }
}

/// In-process pub/sub router.
///
/// - No IO / no async
/// - Depth-first: nested publishes finish before the outer one continues
/// - Explicitly constructed; share it with `Arc` where several owners need it
pub struct Dispatcher<E: Event> {
    registry: RwLock<HashMap<E::Kind, Vec<SharedSubscriber<E>>>>,
}

impl<E: Event> Dispatcher<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `subscriber` to the list for `kind`.
    pub fn subscribe(&self, kind: E::Kind, subscriber: SharedSubscriber<E>) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(%kind, subscriber = subscriber.name(), "subscribed");
        registry.entry(kind).or_default().push(subscriber);
    }

    /// Remove every occurrence of `subscriber` from the list for `kind`.
    ///
    /// No-op when the kind has no list or the handle is not registered.
    pub fn unsubscribe(&self, kind: E::Kind, subscriber: &SharedSubscriber<E>) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = registry.get_mut(&kind) {
            let before = list.len();
            list.retain(|s| !same_subscriber(s, subscriber));
            tracing::debug!(
                %kind,
                subscriber = subscriber.name(),
                removed = before - list.len(),
                "unsubscribed"
            );
        }
    }

    /// Deliver `event` to every subscriber of its kind, in registration order.
    ///
    /// An unregistered kind is zero subscribers, not an error. The first
    /// subscriber failure stops delivery and is returned.
    pub fn publish(&self, event: E) -> Result<(), DispatchError> {
        let span = tracing::debug_span!("publish", event_type = event.event_type());
        let _enter = span.enter();

        let subscribers = self.snapshot(event.kind());
        tracing::debug!(subscribers = subscribers.len(), "dispatching event");

        for subscriber in &subscribers {
            subscriber
                .handle(&event, self)
                .map_err(|source| DispatchError::Subscriber {
                    event_type: event.event_type(),
                    subscriber: subscriber.name(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Number of registrations (duplicates included) for `kind`.
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.get(&kind).map(Vec::len).unwrap_or(0)
    }

    fn snapshot(&self, kind: E::Kind) -> Vec<SharedSubscriber<E>> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.get(&kind).cloned().unwrap_or_default()
    }
}

impl<E: Event> Default for Dispatcher<E> {
    fn default() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Event> core::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (kind, list) in registry.iter() {
            map.entry(kind, &list.len());
        }
        map.finish()
    }
}

// Data pointers only: vtable pointers are not unique per type.
fn same_subscriber<E: Event>(a: &SharedSubscriber<E>, b: &SharedSubscriber<E>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
