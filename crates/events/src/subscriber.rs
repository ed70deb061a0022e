use std::sync::Arc;

use vendnet_core::DomainResult;

use crate::{Dispatcher, Event};

/// Shared handle to a registered subscriber.
///
/// Subscriptions are tracked by handle identity: unsubscribing requires the same
/// `Arc` (or a clone of it) that was passed to `subscribe`.
pub type SharedSubscriber<E> = Arc<dyn Subscriber<E>>;

/// Handles events of one kind, synchronously.
///
/// The dispatcher that delivered the event is passed in, so a subscriber can
/// publish derived events re-entrantly. Such nested publishes complete before
/// control returns to the subscriber.
///
/// Returning an error aborts delivery of the current event to the remaining
/// subscribers and surfaces from `publish`.
pub trait Subscriber<E: Event>: Send + Sync {
    fn handle(&self, event: &E, dispatcher: &Dispatcher<E>) -> DomainResult<()>;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Adapter turning a closure into a [`Subscriber`].
pub struct FnSubscriber<F> {
    name: &'static str,
    f: F,
}

impl<E, F> Subscriber<E> for FnSubscriber<F>
where
    E: Event,
    F: Fn(&E, &Dispatcher<E>) -> DomainResult<()> + Send + Sync,
{
    fn handle(&self, event: &E, dispatcher: &Dispatcher<E>) -> DomainResult<()> {
        (self.f)(event, dispatcher)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Wrap a closure as a shareable subscriber.
pub fn from_fn<E, F>(name: &'static str, f: F) -> SharedSubscriber<E>
where
    E: Event,
    F: Fn(&E, &Dispatcher<E>) -> DomainResult<()> + Send + Sync + 'static,
{
    Arc::new(FnSubscriber { name, f })
}
