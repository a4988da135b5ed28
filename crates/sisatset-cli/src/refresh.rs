//! Change notifications for views that cache household data.
//!
//! Submitting a schedule, or adding and removing children, changes what the
//! schedule views show. Interested parties subscribe to a [`ChangeFeed`]
//! instead of polling the store.

use std::fmt;

/// Something other views may need to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    ScheduleUpdated,
}

type Subscriber = Box<dyn Fn(Change)>;

/// Synchronous observer list; subscribers run in registration order.
#[derive(Default)]
pub struct ChangeFeed {
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(Change) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&self, change: Change) {
        tracing::debug!(?change, subscribers = self.subscribers.len(), "publishing change");
        for subscriber in &self.subscribers {
            subscriber(change);
        }
    }
}
