//! Concrete pipeline sources
//!
//! Two small sources cover the common cases:
//! - `VecFlow` - emits a fixed sequence, then completes
//! - `StreamFlow` - drains a `futures::Stream` when subscribed

use std::sync::{Mutex, PoisonError};

use futures::pin_mut;
use futures::stream::{Stream, StreamExt};

use crate::core::RuntimeError;

use super::types::{Flow, SubscriberRef};

/// Pipeline that emits a fixed sequence of items, then completes.
///
/// Each subscription receives its own clone of every item, so the flow can
/// be subscribed to any number of times.
pub struct VecFlow<T> {
    items: Vec<T>,
}

impl<T> VecFlow<T> {
    /// Create a flow over the given items
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone + Send + Sync + 'static> Flow for VecFlow<T> {
    fn subscribe_raw(&self, subscriber: SubscriberRef) {
        for item in &self.items {
            subscriber.on_next(Box::new(item.clone()));
        }
        subscriber.on_complete();
    }
}

/// Pipeline that drains an async stream on the subscribing thread.
///
/// The stream is consumed by the first subscription; a later subscription
/// receives `RuntimeError::SourceConsumed` through `on_error`.
pub struct StreamFlow<S> {
    stream: Mutex<Option<S>>,
}

impl<S> StreamFlow<S> {
    /// Create a flow over the given stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
        }
    }
}

impl<S> Flow for StreamFlow<S>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    fn subscribe_raw(&self, subscriber: SubscriberRef) {
        let stream = self
            .stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(stream) = stream else {
            subscriber.on_error(Box::new(RuntimeError::SourceConsumed));
            return;
        };

        let subscriber_ref = subscriber.clone();
        futures::executor::block_on(async move {
            pin_mut!(stream);
            while let Some(item) = stream.next().await {
                subscriber_ref.on_next(Box::new(item));
            }
        });
        subscriber.on_complete();
    }
}
