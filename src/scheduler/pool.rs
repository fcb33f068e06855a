//! Default tokio-backed schedulers
//!
//! One implementation covers all three kinds; the kind decides the pool
//! shape and whether tasks run on the blocking pool.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::core::{panic_message, RuntimeError, RuntimeResult};
use crate::hooks;

use super::types::{Scheduler, SchedulerKind, SchedulerRef, Task};

/// Default scheduler implementation backed by a dedicated tokio runtime.
pub struct PoolScheduler {
    rt: Runtime,
    kind: SchedulerKind,
}

impl PoolScheduler {
    /// Build the default scheduler for `kind`.
    pub fn build(kind: SchedulerKind) -> RuntimeResult<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(format!("rivulet-{}", kind));
        // Io work runs on the blocking pool, so its async side stays minimal.
        if kind != SchedulerKind::Compute {
            builder.worker_threads(1);
        }
        let rt = builder
            .build()
            .map_err(|source| RuntimeError::SchedulerBuild {
                name: kind.as_str(),
                source,
            })?;
        Ok(Self { rt, kind })
    }

    /// Build the default scheduler for `kind` behind a shared handle.
    pub fn build_ref(kind: SchedulerKind) -> RuntimeResult<SchedulerRef> {
        Ok(Arc::new(Self::build(kind)?))
    }
}

impl Scheduler for PoolScheduler {
    fn schedule(&self, task: Task) {
        let task = hooks::global().on_schedule(task);
        let kind = self.kind;
        let run = move || {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(move || task())) {
                hooks::global().on_undeliverable(Some(Box::new(RuntimeError::TaskPanicked {
                    scheduler: kind.as_str(),
                    message: panic_message(payload.as_ref()),
                })));
            }
        };
        match self.kind {
            SchedulerKind::Io => {
                self.rt.spawn_blocking(run);
            }
            _ => {
                self.rt.spawn(async move { run() });
            }
        }
    }

    fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}
