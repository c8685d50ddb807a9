//! Synchronous publish/subscribe registry.
//!
//! # Dispatch order
//!
//! Handlers run in global registration order, regardless of which pattern
//! they were registered under. The matching handlers are copied out of the
//! registry before the first one runs, so a handler may subscribe,
//! unsubscribe or publish freely: registry changes apply to the next
//! publish, and nested publishes finish (depth-first) before the outer one
//! continues.
//!
//! # Failure
//!
//! A panicking handler is not caught. The panic unwinds to the publisher
//! and the remaining handlers for that event do not run. No lock is held
//! while a handler runs, so the bus stays usable afterwards.

use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use tracing::trace;

use super::Event;

/// A subscriber callback. Compared by identity (`Arc::ptr_eq`).
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Which event names a subscription matches.
#[derive(Debug, Clone)]
pub enum EventPattern {
    /// Every event (registered as `*`).
    All,
    /// One event name.
    Exact(String),
    /// Every name the regular expression matches.
    Matching(Regex),
}

impl EventPattern {
    /// Compile a regular expression pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error.
    pub fn matching(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Matching)
    }

    /// Whether an event named `name` is delivered to this pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(exact) => exact == name,
            Self::Matching(regex) => regex.is_match(name),
        }
    }

    /// Patterns are the same registry key when they are the same kind with
    /// the same source text.
    fn same_key(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::All, Self::All) => true,
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Matching(a), Self::Matching(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<&str> for EventPattern {
    fn from(name: &str) -> Self {
        if name == "*" {
            Self::All
        } else {
            Self::Exact(name.to_owned())
        }
    }
}

impl From<String> for EventPattern {
    fn from(name: String) -> Self {
        if name == "*" {
            Self::All
        } else {
            Self::Exact(name)
        }
    }
}

impl From<Regex> for EventPattern {
    fn from(regex: Regex) -> Self {
        Self::Matching(regex)
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Exact(name) => f.write_str(name),
            Self::Matching(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Field-wise merge used by [`EventBus::trigger`].
pub trait Merge {
    /// Overlay `payload` on `self`. Fields set in `payload` win; unset
    /// fields keep the value from `self`.
    #[must_use]
    fn merge(self, payload: Self) -> Self;
}

struct Subscription {
    pattern: EventPattern,
    handler: Handler,
}

/// The storefront event bus.
///
/// Cheaply cloneable; every clone shares the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`.
    ///
    /// Registering the same handler twice makes it run twice per event.
    pub fn subscribe(&self, pattern: impl Into<EventPattern>, handler: Handler) {
        let pattern = pattern.into();
        trace!(pattern = %pattern, "subscribe");
        self.write().push(Subscription { pattern, handler });
    }

    /// Register a closure and return its handle for a later
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn on<F>(&self, pattern: impl Into<EventPattern>, f: F) -> Handler
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handler = handler(f);
        self.subscribe(pattern, Arc::clone(&handler));
        handler
    }

    /// Remove every registration of `handler` under `pattern`.
    ///
    /// Returns whether anything was removed.
    pub fn unsubscribe(&self, pattern: &EventPattern, handler: &Handler) -> bool {
        let mut subscriptions = self.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| !(s.pattern.same_key(pattern) && Arc::ptr_eq(&s.handler, handler)));
        before != subscriptions.len()
    }

    /// Register `handler` for every event.
    pub fn on_all(&self, handler: Handler) {
        self.subscribe(EventPattern::All, handler);
    }

    /// Drop every subscription.
    pub fn off_all(&self) {
        self.write().clear();
    }

    /// Number of registrations.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.read().len()
    }

    /// Deliver `event` to every matching handler.
    ///
    /// Publishing an event nobody listens to is a no-op.
    pub fn publish(&self, event: &Event) {
        let name = event.name();
        let handlers: Vec<Handler> = self
            .read()
            .iter()
            .filter(|s| s.pattern.matches(name))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        if handlers.is_empty() {
            trace!(event = name, "No subscribers");
            return;
        }

        trace!(event = name, handlers = handlers.len(), "Publishing");
        for handler in &handlers {
            handler(event);
        }
    }

    /// Build a callback that publishes `defaults` overlaid with an optional
    /// payload.
    pub fn trigger<T>(&self, defaults: T) -> impl Fn(Option<T>) + Send + Sync + 'static
    where
        T: Merge + Clone + Into<Event> + Send + Sync + 'static,
    {
        let bus = self.clone();
        move |payload| {
            let data = match payload {
                Some(payload) => defaults.clone().merge(payload),
                None => defaults.clone(),
            };
            bus.publish(&data.into());
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
