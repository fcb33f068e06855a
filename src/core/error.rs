//! Runtime error types

use std::any::Any;

use thiserror::Error;

/// Boxed error payload handed around by the runtime.
///
/// Hosts report their own error types through the undeliverable-error path;
/// the runtime never inspects them beyond `Display`/`Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the stream runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Hook configuration was rejected because the registry is locked down
    #[error("hooks can't be changed anymore")]
    HooksLocked,

    /// An undeliverable error was reported without an actual error value
    #[error("undeliverable error reported without a cause")]
    MissingError,

    /// A default scheduler pool could not be constructed
    #[error("failed to build {name} scheduler: {source}")]
    SchedulerBuild {
        /// Scheduler display name
        name: &'static str,
        /// Underlying error from the pool builder
        #[source]
        source: std::io::Error,
    },

    /// A scheduled task panicked and its failure had nowhere else to go
    #[error("task on {scheduler} scheduler panicked: {message}")]
    TaskPanicked {
        /// Scheduler the task was queued on
        scheduler: &'static str,
        /// Rendered panic payload
        message: String,
    },

    /// A one-shot pipeline source was subscribed to more than once
    #[error("stream source already consumed by an earlier subscription")]
    SourceConsumed,
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Best-effort rendering of a panic payload into a message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
