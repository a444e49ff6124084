//! The broker contains the topic notification core: topic key derivation,
//! subscription filters, the fan-out table and the subscription handles that
//! consume it.
//!
//! Public types:
//! - `Broker`: registers subscriptions and dispatches events to them.
//! - `Subscription`: stream of `Delivery` values for one subscriber.
//! - `Filter`: per-subscription delivery gate.
//! - `TopicKey` / `KeyDeriver`: channel identifiers and how to build them.

pub mod engine;
pub mod filter;
pub mod message;
pub mod subscription;
pub mod topic;

pub use engine::{Broker, BrokerConfig};
pub use filter::Filter;
pub use message::Delivery;
pub use subscription::{Subscription, SubscriptionId};
pub use topic::{KeyDeriver, KeyPart, TopicKey, derive_key};
