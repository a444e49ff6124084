//! Resolvers built on the notification core.
//!
//! - `chat`: room messages partitioned by room number and message kind.
//! - `counter`: a counter that notifies subscribers of even values.
//!
//! Each resolver receives the `PubSub` it publishes to at construction time.

pub mod chat;
pub mod counter;

pub use chat::{ChatMessage, ChatRoom, MessageType};
pub use counter::{Counter, CounterCommand};

#[cfg(test)]
mod tests;
