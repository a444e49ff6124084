//! Delivery envelope
//!
//! `Delivery` is what a subscription yields for every event the broker
//! enqueued on it.
//!
//! - `topic`: the key the event was dispatched under. A subscription listening
//!   on several topics can tell them apart with it.
//! - `payload`: the published event, cloned per subscription.
//! - `sequence`: broker-wide dispatch counter, unique per dispatch and
//!   ordered for sequential dispatches. Concurrent dispatches may enqueue
//!   out of sequence order.
//! - `timestamp`: milliseconds since the UNIX epoch, set at dispatch.

use serde::Serialize;

use crate::broker::topic::TopicKey;

#[derive(Debug, Clone, Serialize)]
pub struct Delivery<E> {
    pub topic: TopicKey,
    pub payload: E,
    pub sequence: u64,
    pub timestamp: i64,
}

impl<E> Delivery<E> {
    pub fn into_payload(self) -> E {
        self.payload
    }
}
