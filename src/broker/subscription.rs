//! Subscriptions
//!
//! The broker keeps the sending half of every subscription's channel; the
//! subscriber holds a `Subscription`, the receiving half. A `Subscription` is
//! a `futures::Stream` of `Delivery` values that only ends when the broker
//! drops the sender (deregistration or broker shutdown).
//!
//! Dropping the handle is how a subscriber disconnects: `Drop` removes the
//! registration from every topic before returning.

use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use uuid::Uuid;

use crate::broker::engine::Shared;
use crate::broker::message::Delivery;
use crate::broker::topic::TopicKey;

pub type SubscriptionId = Uuid;

pub(crate) enum Outbox<E> {
    Bounded(mpsc::Sender<Delivery<E>>),
    Unbounded(mpsc::UnboundedSender<Delivery<E>>),
}

pub(crate) enum Inbox<E> {
    Bounded(mpsc::Receiver<Delivery<E>>),
    Unbounded(mpsc::UnboundedReceiver<Delivery<E>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendOutcome {
    Sent,
    Full,
    Closed,
}

/// Build the channel pair for a subscription. `capacity == 0` means unbounded.
pub(crate) fn channel<E>(capacity: usize) -> (Outbox<E>, Inbox<E>) {
    if capacity == 0 {
        let (tx, rx) = mpsc::unbounded_channel();
        (Outbox::Unbounded(tx), Inbox::Unbounded(rx))
    } else {
        let (tx, rx) = mpsc::channel(capacity);
        (Outbox::Bounded(tx), Inbox::Bounded(rx))
    }
}

impl<E> Outbox<E> {
    /// Enqueue without waiting for the subscriber.
    pub(crate) fn send(&self, delivery: Delivery<E>) -> SendOutcome {
        match self {
            Outbox::Bounded(tx) => match tx.try_send(delivery) {
                Ok(()) => SendOutcome::Sent,
                Err(TrySendError::Full(_)) => SendOutcome::Full,
                Err(TrySendError::Closed(_)) => SendOutcome::Closed,
            },
            Outbox::Unbounded(tx) => match tx.send(delivery) {
                Ok(()) => SendOutcome::Sent,
                Err(_) => SendOutcome::Closed,
            },
        }
    }
}

impl<E> Inbox<E> {
    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<Delivery<E>>> {
        match self {
            Inbox::Bounded(rx) => rx.poll_recv(cx),
            Inbox::Unbounded(rx) => rx.poll_recv(cx),
        }
    }

    fn try_recv(&mut self) -> Option<Delivery<E>> {
        match self {
            Inbox::Bounded(rx) => rx.try_recv().ok(),
            Inbox::Unbounded(rx) => rx.try_recv().ok(),
        }
    }
}

/// Receiving end of one registration.
pub struct Subscription<E> {
    id: SubscriptionId,
    topics: Vec<TopicKey>,
    inbox: Inbox<E>,
    broker: Weak<Shared<E>>,
}

impl<E> Subscription<E> {
    pub(crate) fn new(
        id: SubscriptionId,
        topics: Vec<TopicKey>,
        inbox: Inbox<E>,
        broker: Weak<Shared<E>>,
    ) -> Self {
        Self {
            id,
            topics,
            inbox,
            broker,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Topics this subscription was registered under, sorted and deduplicated.
    pub fn topics(&self) -> &[TopicKey] {
        &self.topics
    }

    /// Wait for the next delivery. `None` once the subscription has been
    /// deregistered (or the broker dropped) and the buffer is drained.
    pub async fn recv(&mut self) -> Option<Delivery<E>> {
        futures::future::poll_fn(|cx| self.inbox.poll_recv(cx)).await
    }

    /// Take a buffered delivery without waiting.
    pub fn try_recv(&mut self) -> Option<Delivery<E>> {
        self.inbox.try_recv()
    }

    /// Disconnect explicitly. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}

    /// Turn the subscription into the plain event stream resolvers hand out.
    pub fn into_payloads(self) -> impl Stream<Item = E> + Send + Unpin
    where
        E: Send + 'static,
    {
        self.map(Delivery::into_payload)
    }
}

impl<E> Stream for Subscription<E> {
    type Item = Delivery<E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inbox.poll_recv(cx)
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(shared) = self.broker.upgrade() {
            if shared.remove(&self.id) {
                debug!("Subscription {} dropped and deregistered", self.id);
            }
        }
    }
}

impl<E> std::fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topics", &self.topics)
            .finish()
    }
}
