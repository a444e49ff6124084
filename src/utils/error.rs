//! The `error` module defines the error types used within `topicwire`.
//!
//! Errors are split by the layer that raises them:
//!
//! - `TopicError`: a topic key could not be derived unambiguously.
//! - `FilterError`: a subscription filter failed. Never escapes the broker;
//!   the broker logs it and treats the event as rejected.
//! - `BrokerError`: a registration request was malformed.
//! - `ResolverError`: raised by the chat and counter resolvers.
//!
//! Deregistering an unknown subscription is not an error and has no variant.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("cannot derive a topic key from an empty component sequence")]
    EmptySequence,
    #[error("topic key component {index} is empty")]
    EmptyComponent { index: usize },
    #[error("topic key component '{component}' contains the separator '{separator}'")]
    ContainsSeparator { component: String, separator: char },
    #[error("'{0}' cannot be used as a topic key separator")]
    InvalidSeparator(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter evaluation failed: {0}")]
    Evaluation(String),
    #[error("filter panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("a subscription needs at least one topic")]
    EmptyTopicSet,
    #[error(transparent)]
    Topic(#[from] TopicError),
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error(transparent)]
    Topic(#[from] TopicError),
}
