//! Schedulers and task dispatch
//!
//! This module provides the execution seam the hook registry intercepts:
//! - `Scheduler` / `Task` - the unit-of-work contract
//! - `SchedulerKind` - the three named shared schedulers
//! - `PoolScheduler` - tokio-backed defaults
//! - `compute` / `io` / `single` - process-wide singletons with two-tier
//!   hook routing (init once at construction, override on every access)

mod pool;
mod shared;
mod types;

pub use pool::PoolScheduler;
pub use shared::{compute, io, shared, single};
pub use types::{Scheduler, SchedulerKind, SchedulerRef, Task};
