use core::fmt::{Debug, Display};
use core::hash::Hash;

/// A domain-agnostic event.
///
/// Events are **immutable** facts. Each one carries a routing kind, which the
/// [`Dispatcher`](crate::Dispatcher) uses as the subscription key.
pub trait Event: Clone + Debug + Send + Sync + 'static {
    /// Closed set of routing keys (typically a fieldless enum).
    type Kind: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Routing key for this event.
    fn kind(&self) -> Self::Kind;

    /// Stable event name/type identifier (e.g. "vending.sale").
    fn event_type(&self) -> &'static str;
}
