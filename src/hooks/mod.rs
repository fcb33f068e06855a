//! Runtime Hooks
//!
//! A process-wide registry of override functions that intercept the
//! runtime's lifecycle events without touching its internals.
//!
//! # Overview
//!
//! Hooks let a host:
//! - Substitute or wrap every pipeline as it is assembled
//! - Wrap every observer as it subscribes
//! - Wrap every unit of work handed to a scheduler
//! - Replace a shared scheduler at construction, or redirect every access
//! - Route undeliverable errors somewhere useful
//!
//! Each extension point has exactly one slot holding at most one override;
//! installing a new override replaces the old one. With no override
//! installed, every wrapper is a passthrough and the runtime behaves as if
//! this module did not exist.
//!
//! # Example
//!
//! ```ignore
//! use rivulet::hooks;
//! use rivulet::scheduler::SchedulerKind;
//!
//! // Route undeliverable errors into the host's reporter.
//! hooks::global().set_error_hook(|error| {
//!     my_reporter::report(error);
//! })?;
//!
//! // Run all "io" work on the compute pool.
//! let compute = rivulet::scheduler::compute()?;
//! hooks::global().set_scheduler_hook(SchedulerKind::Io, move |_current| compute.clone())?;
//!
//! // Freeze configuration so later-loaded code can't change it.
//! hooks::global().lockdown();
//! ```
//!
//! # Hook slots
//!
//! | Slot | Triggered by | Shape |
//! |------|--------------|-------|
//! | assembly | a pipeline is constructed | `Fn(FlowRef) -> FlowRef` |
//! | subscribe | an observer subscribes | `Fn(SubscriberRef) -> SubscriberRef` |
//! | schedule | a task is handed to a scheduler | `Fn(Task) -> Task` |
//! | scheduler init (per kind) | first construction of the shared scheduler | `Fn(SchedulerRef) -> SchedulerRef` |
//! | scheduler override (per kind) | every access to the shared scheduler | `Fn(SchedulerRef) -> SchedulerRef` |
//! | error | an undeliverable error is reported | `Fn(&dyn Error)` |
//!
//! # Lockdown
//!
//! `lockdown()` permanently freezes configuration: every set, clear, and
//! reset afterwards fails loudly with `RuntimeError::HooksLocked` and leaves
//! the slots untouched. Reads and invocations are never affected.

mod registry;
mod types;

pub use registry::{global, RuntimeHooks};
pub use types::{AssemblyHook, ErrorHook, ScheduleHook, SchedulerHook, SubscribeHook};
