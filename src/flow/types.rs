//! Pipeline and observer seam types
//!
//! Pipelines and observers are held behind object-safe traits so the hook
//! registry can store one override per extension point regardless of the
//! concrete item type. Items are type-erased; consumers that need the
//! concrete type use a checked `downcast`.

use std::any::Any;
use std::sync::Arc;

use crate::core::BoxError;

/// A type-erased item flowing through a pipeline.
pub type Item = Box<dyn Any + Send>;

/// Receives the events of one subscription.
pub trait Subscriber: Send + Sync {
    /// Called for each item the pipeline emits
    fn on_next(&self, item: Item);

    /// Called at most once when the pipeline fails
    fn on_error(&self, error: BoxError);

    /// Called at most once when the pipeline completes
    fn on_complete(&self);
}

/// Shared handle to a subscriber.
pub type SubscriberRef = Arc<dyn Subscriber>;

/// A stream pipeline that can deliver events to a subscriber.
pub trait Flow: Send + Sync {
    /// Deliver this pipeline's events to `subscriber`.
    ///
    /// Implementations receive the subscriber exactly as handed to them;
    /// hook routing happens in [`subscribe`](crate::flow::subscribe).
    fn subscribe_raw(&self, subscriber: SubscriberRef);
}

/// Shared handle to a pipeline.
pub type FlowRef = Arc<dyn Flow>;
