//! A shared counter that announces even values on the `even` topic.
//! Subscribers skip multiples of four.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::broker::{Filter, TopicKey};
use crate::client::PubSub;
use crate::utils::error::ResolverError;

pub const EVEN_TOPIC: &str = "even";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterCommand {
    Up,
    Down,
}

impl FromStr for CounterCommand {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(CounterCommand::Up),
            "down" => Ok(CounterCommand::Down),
            _ => Err(ResolverError::UnknownCommand(s.to_string())),
        }
    }
}

pub fn is_not_multiple_of_four(value: &i64) -> bool {
    value % 4 != 0
}

#[derive(Debug)]
pub struct Counter {
    value: Mutex<i64>,
    topic: TopicKey,
    pubsub: PubSub<i64>,
}

impl Counter {
    pub fn new(pubsub: PubSub<i64>) -> Result<Self, ResolverError> {
        Self::starting_at(pubsub, 0)
    }

    pub fn starting_at(pubsub: PubSub<i64>, value: i64) -> Result<Self, ResolverError> {
        let topic = pubsub.topic([EVEN_TOPIC])?;
        Ok(Self {
            value: Mutex::new(value),
            topic,
            pubsub,
        })
    }

    pub fn hello(&self) -> &'static str {
        "world!"
    }

    pub fn value(&self) -> i64 {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `command` and return the new value, saturating at the `i64`
    /// bounds. Even values are published while the counter is still locked,
    /// so subscribers see them in order.
    ///
    /// Subscriber filters run under that lock and must not call back into
    /// this counter (`value`, `count`), or they deadlock.
    pub fn count(&self, command: CounterCommand) -> i64 {
        let mut value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        *value = match command {
            CounterCommand::Up => value.saturating_add(1),
            CounterCommand::Down => value.saturating_sub(1),
        };

        if *value % 2 == 0 {
            let delivered = self.pubsub.publish(&self.topic, *value);
            debug!("Counter reached {}, notified {delivered} subscriber(s)", *value);
        }
        *value
    }

    pub fn subscribe_even(
        &self,
    ) -> Result<impl Stream<Item = i64> + Send + Unpin + use<>, ResolverError> {
        let subscription = self.pubsub.subscribe(
            [self.topic.clone()],
            Some(Filter::new(is_not_multiple_of_four)),
        )?;
        Ok(subscription.into_payloads())
    }
}
