//! # topicwire
//!
//! `topicwire` is a small, in-process topic notification core: publishers
//! hand events to a broker under a topic key, and subscribers receive the
//! events of the topics they listen on as an async stream, optionally gated
//! by a per-subscription filter.
//!
//! ## Core Modules
//!
//! - `broker`: topic keys, filters, the fan-out table and subscription handles.
//! - `client`: `Publisher` and `PubSub`, the surface resolvers call into.
//! - `config`: loading and merging settings from file and environment.
//! - `resolvers`: the chat room and counter built on top of the core.
//! - `utils`: error types and tracing setup.
//!
//! There is no persistence and no replay: an event published while nobody
//! listens on its topic is gone.

pub mod broker;
pub mod client;
pub mod config;
pub mod resolvers;
pub mod utils;

pub use broker::{
    Broker, BrokerConfig, Delivery, Filter, KeyDeriver, KeyPart, Subscription, TopicKey, derive_key,
};
pub use client::{PubSub, Publisher};
