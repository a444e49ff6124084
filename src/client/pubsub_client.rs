use crate::broker::{Broker, Filter, KeyDeriver, KeyPart, Subscription, TopicKey};
use crate::config::Settings;
use crate::utils::error::{BrokerError, TopicError};

/// Publishing half of the notification core.
///
/// Mutation-style handlers hold a `Publisher` and call `publish` after a
/// state change. Publishing never fails and never waits on subscribers.
#[derive(Debug)]
pub struct Publisher<E> {
    broker: Broker<E>,
}

impl<E> Clone for Publisher<E> {
    fn clone(&self) -> Self {
        Self {
            broker: self.broker.clone(),
        }
    }
}

impl<E: Clone> Publisher<E> {
    pub fn new(broker: Broker<E>) -> Self {
        Self { broker }
    }

    /// Hand `event` to the broker for `topic`.
    ///
    /// Returns the number of subscriptions it was enqueued on; `0` when
    /// nobody listens. There is no replay, so such an event is gone.
    pub fn publish(&self, topic: &TopicKey, event: E) -> usize {
        self.broker.dispatch(topic, event)
    }
}

/// The two operations a resolver layer needs, `publish` and `subscribe`,
/// together with the key deriver configured for this process.
#[derive(Debug)]
pub struct PubSub<E> {
    broker: Broker<E>,
    deriver: KeyDeriver,
}

impl<E> Clone for PubSub<E> {
    fn clone(&self) -> Self {
        Self {
            broker: self.broker.clone(),
            deriver: self.deriver,
        }
    }
}

impl<E> Default for PubSub<E> {
    fn default() -> Self {
        Self::new(Broker::default(), KeyDeriver::default())
    }
}

impl<E> PubSub<E> {
    pub fn new(broker: Broker<E>, deriver: KeyDeriver) -> Self {
        Self { broker, deriver }
    }

    /// Build a `PubSub` from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, TopicError> {
        Ok(Self::new(
            Broker::with_config(settings.broker_config()),
            settings.key_deriver()?,
        ))
    }

    pub fn broker(&self) -> &Broker<E> {
        &self.broker
    }

    pub fn deriver(&self) -> KeyDeriver {
        self.deriver
    }

    /// Derive a topic key with this instance's separator.
    pub fn topic<I, P>(&self, components: I) -> Result<TopicKey, TopicError>
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        self.deriver.derive(components)
    }

    /// Subscribe to `topics`, optionally gated by `filter`.
    ///
    /// The subscription lives until the returned handle is dropped.
    pub fn subscribe<I>(
        &self,
        topics: I,
        filter: Option<Filter<E>>,
    ) -> Result<Subscription<E>, BrokerError>
    where
        I: IntoIterator<Item = TopicKey>,
    {
        self.broker.register(topics, filter)
    }

    /// `subscribe` with a plain predicate as the filter.
    pub fn subscribe_filtered<I, F>(
        &self,
        topics: I,
        predicate: F,
    ) -> Result<Subscription<E>, BrokerError>
    where
        I: IntoIterator<Item = TopicKey>,
        F: Fn(&E) -> bool + Send + Sync + 'static,
        E: 'static,
    {
        self.broker.register(topics, Some(Filter::new(predicate)))
    }
}

impl<E: Clone> PubSub<E> {
    pub fn publisher(&self) -> Publisher<E> {
        Publisher::new(self.broker.clone())
    }

    pub fn publish(&self, topic: &TopicKey, event: E) -> usize {
        self.broker.dispatch(topic, event)
    }
}
