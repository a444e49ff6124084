//! The `utils` module holds the pieces shared by every other module:
//! the crate's error types and the tracing setup used by the binary.

pub mod error;
pub mod logging;

pub use error::{BrokerError, FilterError, ResolverError, TopicError};
