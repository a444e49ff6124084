//! Broker engine
//!
//! This module contains the in-memory fan-out table responsible for:
//! - registering subscriptions under every topic they listen on
//! - removing them from all of those topics in one step
//! - dispatching a published event to every live, accepting subscription
//!
//! Concurrency and usage notes:
//! - `Broker` is a cheap `Clone` around shared state; hand a clone to every
//!   resolver that publishes or subscribes.
//! - The table sits behind one `RwLock`. Registration and deregistration take
//!   the write lock; dispatch takes the read lock only long enough to snapshot
//!   the entries for one topic. Filters run and channels are fed after the
//!   lock is released, so a slow filter never blocks registration.
//! - Enqueueing never waits. A full bounded channel drops the event for that
//!   subscription only; a closed one gets its registration removed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::broker::filter::Filter;
use crate::broker::message::Delivery;
use crate::broker::subscription::{self, Outbox, SendOutcome, Subscription, SubscriptionId};
use crate::broker::topic::TopicKey;
use crate::utils::error::BrokerError;

/// Runtime parameters of a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Per-subscription buffer size. `0` means unbounded.
    pub channel_capacity: usize,
}

impl BrokerConfig {
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

struct Entry<E> {
    id: SubscriptionId,
    filter: Option<Filter<E>>,
    outbox: Outbox<E>,
    live: AtomicBool,
}

struct Table<E> {
    topics: HashMap<TopicKey, HashMap<SubscriptionId, Arc<Entry<E>>>>,
    subscriptions: HashMap<SubscriptionId, BTreeSet<TopicKey>>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            topics: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }
}

pub(crate) struct Shared<E> {
    table: RwLock<Table<E>>,
    config: BrokerConfig,
    sequence: AtomicU64,
}

impl<E> Shared<E> {
    // Filters are run outside the lock and their panics are caught, so a
    // poisoned lock still guards a consistent table.
    fn read(&self) -> RwLockReadGuard<'_, Table<E>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table<E>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove a subscription from every topic. Returns `false` if it was not registered.
    pub(crate) fn remove(&self, id: &SubscriptionId) -> bool {
        let mut guard = self.write();
        let table = &mut *guard;

        let Some(topics) = table.subscriptions.remove(id) else {
            return false;
        };

        for topic in &topics {
            if let Some(subscribers) = table.topics.get_mut(topic) {
                if let Some(entry) = subscribers.remove(id) {
                    entry.live.store(false, Ordering::Release);
                }
                if subscribers.is_empty() {
                    table.topics.remove(topic);
                }
            }
        }
        true
    }
}

/// Process-wide fan-out table mapping topics to live subscriptions.
pub struct Broker<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Clone for Broker<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> Default for Broker<E> {
    fn default() -> Self {
        Self::with_config(BrokerConfig::default())
    }
}

impl<E> fmt::Debug for Broker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.shared.read();
        f.debug_struct("Broker")
            .field("config", &self.shared.config)
            .field("topics", &table.topics.len())
            .field("subscriptions", &table.subscriptions.len())
            .finish()
    }
}

impl<E> Broker<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: RwLock::new(Table::default()),
                config,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> BrokerConfig {
        self.shared.config
    }

    /// Register a subscription under every key in `topics`.
    ///
    /// Duplicate keys collapse into one registration. The returned handle
    /// deregisters itself when dropped.
    pub fn register<I>(
        &self,
        topics: I,
        filter: Option<Filter<E>>,
    ) -> Result<Subscription<E>, BrokerError>
    where
        I: IntoIterator<Item = TopicKey>,
    {
        let topics: BTreeSet<TopicKey> = topics.into_iter().collect();
        if topics.is_empty() {
            return Err(BrokerError::EmptyTopicSet);
        }

        let id = Uuid::new_v4();
        let (outbox, inbox) = subscription::channel(self.shared.config.channel_capacity);
        let entry = Arc::new(Entry {
            id,
            filter,
            outbox,
            live: AtomicBool::new(true),
        });

        {
            let mut table = self.shared.write();
            for topic in &topics {
                table
                    .topics
                    .entry(topic.clone())
                    .or_default()
                    .insert(id, Arc::clone(&entry));
            }
            table.subscriptions.insert(id, topics.clone());
        }

        debug!(
            "Registered subscription {id} on {} topic(s): {:?}",
            topics.len(),
            topics
        );

        Ok(Subscription::new(
            id,
            topics.into_iter().collect(),
            inbox,
            Arc::downgrade(&self.shared),
        ))
    }

    /// Remove a subscription from every topic. Unknown ids are ignored.
    pub fn deregister(&self, id: &SubscriptionId) {
        if self.shared.remove(id) {
            debug!("Deregistered subscription {id}");
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.shared.read().subscriptions.len()
    }

    /// Number of topics with at least one live subscription.
    pub fn topic_count(&self) -> usize {
        self.shared.read().topics.len()
    }

    /// Number of live subscriptions registered under `topic`.
    pub fn subscribers_of(&self, topic: &TopicKey) -> usize {
        self.shared
            .read()
            .topics
            .get(topic)
            .map_or(0, HashMap::len)
    }

    pub fn is_registered(&self, id: &SubscriptionId) -> bool {
        self.shared.read().subscriptions.contains_key(id)
    }
}

impl<E: Clone> Broker<E> {
    /// Deliver `event` to every live subscription under `topic` whose filter
    /// accepts it. Returns how many subscriptions it was enqueued on.
    pub fn dispatch(&self, topic: &TopicKey, event: E) -> usize {
        let targets: Vec<Arc<Entry<E>>> = {
            let table = self.shared.read();
            match table.topics.get(topic) {
                Some(subscribers) => subscribers.values().cloned().collect(),
                None => {
                    debug!("No subscriptions on topic '{topic}', event discarded");
                    return 0;
                }
            }
        };

        let sequence = self.shared.sequence.fetch_add(1, Ordering::Relaxed);
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in targets {
            if !entry.live.load(Ordering::Acquire) {
                continue;
            }

            if let Some(filter) = &entry.filter {
                match filter.evaluate(&event) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("Subscription {} filtered out event on '{topic}'", entry.id);
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            "Filter of subscription {} failed on '{topic}', event rejected: {e}",
                            entry.id
                        );
                        continue;
                    }
                }
            }

            let delivery = Delivery {
                topic: topic.clone(),
                payload: event.clone(),
                sequence,
                timestamp,
            };

            match entry.outbox.send(delivery) {
                SendOutcome::Sent => delivered += 1,
                SendOutcome::Full => {
                    warn!(
                        "Subscription {} is full, dropping event on '{topic}'",
                        entry.id
                    );
                }
                SendOutcome::Closed => closed.push(entry.id),
            }
        }

        for id in closed {
            if self.shared.remove(&id) {
                debug!("Subscription {id} has no receiver, removed");
            }
        }

        debug!("Dispatched event #{sequence} on '{topic}' to {delivered} subscription(s)");
        delivered
    }
}
