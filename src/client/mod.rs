//! The `client` module is the surface a resolver layer talks to.
//!
//! It provides `Publisher`, for mutation handlers, and `PubSub`, which adds
//! `subscribe` and topic derivation on top of the same broker.

pub mod pubsub_client;
pub use pubsub_client::{PubSub, Publisher};
