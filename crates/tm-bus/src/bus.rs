//! The `EventBus` and its per-topic storage.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::trace;

use crate::SubscriptionId;

/// Callbacks are invoked synchronously from `publish`.
type Callback<M> = Box<dyn FnMut(&M) + Send>;

// ── BusConfig ─────────────────────────────────────────────────────────────────

/// Bus-wide defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Messages retained per topic unless overridden with
    /// [`EventBus::set_capacity`].  Values below 1 are raised to 1.
    pub history: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { history: 100 }
    }
}

// ── Topic ─────────────────────────────────────────────────────────────────────

struct Topic<M> {
    history:     VecDeque<M>,
    capacity:    usize,
    subscribers: Vec<(SubscriptionId, Callback<M>)>,
}

impl<M> Topic<M> {
    fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            subscribers: Vec::new(),
        }
    }

    /// Evict from the front until `history.len() <= capacity`.
    fn trim(&mut self) {
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }
}

// ── EventBus ──────────────────────────────────────────────────────────────────

/// Named-topic publish/subscribe channel with bounded retained history.
///
/// `M` is the message payload.  The simulation uses a single enum for every
/// topic; external observers may run their own bus with any type.
pub struct EventBus<M> {
    topics:           HashMap<String, Topic<M>>,
    default_capacity: usize,
    next_id:          u64,
}

impl<M> EventBus<M> {
    /// Create a bus whose topics retain `history` messages each.
    pub fn new(history: usize) -> Self {
        Self::with_config(BusConfig { history })
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            topics:           HashMap::new(),
            default_capacity: config.history.max(1),
            next_id:          0,
        }
    }

    fn topic_mut(&mut self, topic: &str) -> &mut Topic<M> {
        let capacity = self.default_capacity;
        self.topics.entry(topic.to_owned()).or_insert_with(|| {
            trace!(topic, capacity, "bus topic created");
            Topic::new(capacity)
        })
    }

    // ── Publish / subscribe ───────────────────────────────────────────────

    /// Append `message` to `topic`'s history (evicting the oldest entry on
    /// overflow), then invoke every subscriber in subscription order.
    pub fn publish(&mut self, topic: &str, message: M) {
        let t = self.topic_mut(topic);
        t.history.push_back(message);
        t.trim();
        let Topic { history, subscribers, .. } = t;
        if let Some(latest) = history.back() {
            for (_, callback) in subscribers.iter_mut() {
                callback(latest);
            }
        }
    }

    /// Register `callback` for `topic` and return a handle for a later
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&mut self, topic: &str, callback: F) -> SubscriptionId
    where
        F: FnMut(&M) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.topic_mut(topic).subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove the callback registered under `id`.
    ///
    /// Returns `false` (and does nothing) for unknown topics and for handles
    /// that were never issued for `topic` or were already removed.
    pub fn unsubscribe(&mut self, topic: &str, id: SubscriptionId) -> bool {
        let Some(t) = self.topics.get_mut(topic) else {
            return false;
        };
        match t.subscribers.iter().position(|(sid, _)| *sid == id) {
            Some(pos) => {
                t.subscribers.remove(pos);
                true
            }
            None => false,
        }
    }

    // ── History access ────────────────────────────────────────────────────

    /// The most recent `count` messages on `topic` (all retained messages
    /// when `count` is `None`), oldest first and newest last.
    ///
    /// Unknown topics yield an empty list and are not created.
    pub fn messages(&self, topic: &str, count: Option<usize>) -> Vec<&M> {
        let Some(t) = self.topics.get(topic) else {
            return Vec::new();
        };
        let skip = count.map_or(0, |n| t.history.len().saturating_sub(n));
        t.history.iter().skip(skip).collect()
    }

    /// Remove and return every retained message on `topic`, oldest first.
    ///
    /// Other topics are untouched; this is the per-topic drain consumers use
    /// instead of a global [`clear`](Self::clear).
    pub fn drain(&mut self, topic: &str) -> Vec<M> {
        self.topics
            .get_mut(topic)
            .map(|t| t.history.drain(..).collect())
            .unwrap_or_default()
    }

    /// Empty the history of every topic.  Subscribers are kept.
    pub fn clear(&mut self) {
        for t in self.topics.values_mut() {
            t.history.clear();
        }
    }

    /// Empty the history of one topic.  Subscribers are kept.
    pub fn clear_topic(&mut self, topic: &str) {
        if let Some(t) = self.topics.get_mut(topic) {
            t.history.clear();
        }
    }

    // ── Retention ─────────────────────────────────────────────────────────

    /// Change how many messages `topic` retains, creating the topic if
    /// needed.  Shrinking evicts the oldest messages immediately.
    pub fn set_capacity(&mut self, topic: &str, capacity: usize) {
        let t = self.topic_mut(topic);
        t.capacity = capacity.max(1);
        t.trim();
    }

    /// Retention limit of `topic`, or the bus default for unknown topics.
    pub fn capacity(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(self.default_capacity, |t| t.capacity)
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Number of retained messages on `topic`.
    pub fn len(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |t| t.history.len())
    }

    /// `true` if no topic retains any message.
    pub fn is_empty(&self) -> bool {
        self.topics.values().all(|t| t.history.is_empty())
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |t| t.subscribers.len())
    }

    /// Names of every topic created so far, in no particular order.
    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.topics.keys().map(String::as_str)
    }
}

impl<M> Default for EventBus<M> {
    fn default() -> Self {
        Self::with_config(BusConfig::default())
    }
}

impl<M> fmt::Debug for EventBus<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, t) in &self.topics {
            map.entry(
                name,
                &format_args!("{} msgs / {} cap / {} subs", t.history.len(), t.capacity, t.subscribers.len()),
            );
        }
        map.finish()
    }
}
