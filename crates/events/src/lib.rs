//! Typed publish/subscribe mechanics (domain-agnostic).
//!
//! Events are routed by their [`Event::Kind`] to the subscribers registered for
//! that kind. Dispatch is synchronous and depth-first: a subscriber may publish
//! further events, and those are fully handled before the outer `publish` call
//! returns.

pub mod dispatcher;
pub mod event;
pub mod subscriber;

pub use dispatcher::{DispatchError, Dispatcher};
pub use event::Event;
pub use subscriber::{FnSubscriber, SharedSubscriber, Subscriber, from_fn};
