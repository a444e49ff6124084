//! Subscription filters
//!
//! A `Filter` is the per-subscription gate the broker consults once for every
//! event dispatched to one of the subscription's topics. Predicates may fail,
//! either by returning an error or by panicking; both are reported as a
//! `FilterError` and count as a rejection for that subscription alone.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::utils::error::FilterError;

type Predicate<E> = dyn Fn(&E) -> Result<bool, FilterError> + Send + Sync;

pub struct Filter<E> {
    predicate: Arc<Predicate<E>>,
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

impl<E> Filter<E> {
    /// Wrap an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
        E: 'static,
    {
        Self {
            predicate: Arc::new(move |event: &E| Ok(predicate(event))),
        }
    }

    /// Wrap a predicate that can fail. An `Err` rejects the event.
    pub fn try_new<F, Error>(predicate: F) -> Self
    where
        F: Fn(&E) -> Result<bool, Error> + Send + Sync + 'static,
        Error: fmt::Display,
        E: 'static,
    {
        Self {
            predicate: Arc::new(move |event: &E| {
                predicate(event).map_err(|e| FilterError::Evaluation(e.to_string()))
            }),
        }
    }

    /// Run the predicate, converting failures and panics into `FilterError`.
    pub fn evaluate(&self, event: &E) -> Result<bool, FilterError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(event))) {
            Ok(result) => result,
            Err(payload) => Err(FilterError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// `true` when the event should be delivered. Failures are logged and reject.
    pub fn accept(&self, event: &E) -> bool {
        match self.evaluate(event) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Filter rejected event after failure: {e}");
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
