//! Process-wide shared schedulers
//!
//! One lazily built singleton per [`SchedulerKind`]. First access builds the
//! library default and routes it through the matching scheduler-init hook
//! exactly once; the result is what gets installed. Every access (including
//! the first) then routes the installed singleton through the matching
//! scheduler-override hook, so hosts can redirect scheduler usage per call
//! without touching the singleton itself.

use std::sync::{PoisonError, RwLock};

use crate::core::RuntimeResult;
use crate::hooks::{self, RuntimeHooks};

use super::pool::PoolScheduler;
use super::types::{SchedulerKind, SchedulerRef};

/// Lazily initialized singleton cell for one scheduler kind.
pub(crate) struct SharedCell {
    scheduler: RwLock<Option<SchedulerRef>>,
}

impl SharedCell {
    pub(crate) const fn empty() -> Self {
        Self {
            scheduler: RwLock::new(None),
        }
    }

    /// Return the scheduler for `kind`, building the singleton on first use.
    ///
    /// `build` produces the library default; its result goes through the
    /// init hook before being installed. The init hook runs while the cell
    /// is being initialized and must not itself request the same scheduler.
    pub(crate) fn obtain(
        &self,
        kind: SchedulerKind,
        hooks: &RuntimeHooks,
        build: impl FnOnce() -> RuntimeResult<SchedulerRef>,
    ) -> RuntimeResult<SchedulerRef> {
        let installed = self
            .scheduler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let installed = match installed {
            Some(scheduler) => scheduler,
            None => {
                let mut guard = self.scheduler.write().unwrap_or_else(PoisonError::into_inner);
                match &*guard {
                    Some(scheduler) => scheduler.clone(),
                    None => {
                        let built = hooks.init_scheduler(kind, build()?);
                        tracing::debug!("[Schedulers] Installed {} scheduler singleton", kind);
                        *guard = Some(built.clone());
                        built
                    }
                }
            }
        };

        Ok(hooks.on_scheduler(kind, installed))
    }
}

static SHARED: [SharedCell; 3] = [SharedCell::empty(), SharedCell::empty(), SharedCell::empty()];

/// Shared scheduler for `kind`.
pub fn shared(kind: SchedulerKind) -> RuntimeResult<SchedulerRef> {
    SHARED[kind.index()].obtain(kind, hooks::global(), || PoolScheduler::build_ref(kind))
}

/// Shared general-purpose scheduler for CPU-bound work.
pub fn compute() -> RuntimeResult<SchedulerRef> {
    shared(SchedulerKind::Compute)
}

/// Shared scheduler for blocking I/O-bound work.
pub fn io() -> RuntimeResult<SchedulerRef> {
    shared(SchedulerKind::Io)
}

/// Shared single-worker scheduler; tasks run in submission order.
pub fn single() -> RuntimeResult<SchedulerRef> {
    shared(SchedulerKind::Single)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::scheduler::types::{Scheduler, Task};

    struct InlineScheduler;

    impl Scheduler for InlineScheduler {
        fn schedule(&self, task: Task) {
            task();
        }

        fn name(&self) -> &'static str {
            "inline"
        }
    }

    fn inline() -> SchedulerRef {
        Arc::new(InlineScheduler)
    }

    #[test]
    fn test_init_hook_runs_once_per_cell() {
        let hooks = RuntimeHooks::new();
        let cell = SharedCell::empty();

        let init_calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = init_calls.clone();
        hooks
            .set_scheduler_init_hook(SchedulerKind::Compute, move |default| {
                hook_calls.fetch_add(1, Ordering::SeqCst);
                default
            })
            .unwrap();

        let first = cell
            .obtain(SchedulerKind::Compute, &hooks, || Ok(inline()))
            .unwrap();
        let second = cell
            .obtain(SchedulerKind::Compute, &hooks, || Ok(inline()))
            .unwrap();

        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_init_hook_result_becomes_the_singleton() {
        let hooks = RuntimeHooks::new();
        let cell = SharedCell::empty();

        let substitute = inline();
        let installed = substitute.clone();
        hooks
            .set_scheduler_init_hook(SchedulerKind::Io, move |_default| installed.clone())
            .unwrap();

        let scheduler = cell
            .obtain(SchedulerKind::Io, &hooks, || Ok(inline()))
            .unwrap();
        assert!(Arc::ptr_eq(&scheduler, &substitute));
    }

    #[test]
    fn test_override_hook_runs_on_every_access() {
        let hooks = RuntimeHooks::new();
        let cell = SharedCell::empty();

        let override_calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = override_calls.clone();
        hooks
            .set_scheduler_hook(SchedulerKind::Single, move |current| {
                hook_calls.fetch_add(1, Ordering::SeqCst);
                current
            })
            .unwrap();

        for _ in 0..3 {
            cell.obtain(SchedulerKind::Single, &hooks, || Ok(inline()))
                .unwrap();
        }
        assert_eq!(override_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_override_hook_redirects_without_touching_singleton() {
        let hooks = RuntimeHooks::new();
        let cell = SharedCell::empty();

        let base = cell
            .obtain(SchedulerKind::Compute, &hooks, || Ok(inline()))
            .unwrap();

        let redirect = inline();
        let target = redirect.clone();
        hooks
            .set_scheduler_hook(SchedulerKind::Compute, move |_current| target.clone())
            .unwrap();

        let redirected = cell
            .obtain(SchedulerKind::Compute, &hooks, || Ok(inline()))
            .unwrap();
        assert!(Arc::ptr_eq(&redirected, &redirect));

        // Clearing the override exposes the untouched singleton again.
        hooks.clear_scheduler_hook(SchedulerKind::Compute).unwrap();
        let restored = cell
            .obtain(SchedulerKind::Compute, &hooks, || Ok(inline()))
            .unwrap();
        assert!(Arc::ptr_eq(&restored, &base));
    }

    #[test]
    fn test_build_failure_propagates_and_retries() {
        let hooks = RuntimeHooks::new();
        let cell = SharedCell::empty();

        let failed = cell.obtain(SchedulerKind::Io, &hooks, || {
            Err(crate::core::RuntimeError::SchedulerBuild {
                name: "io",
                source: std::io::Error::other("no threads"),
            })
        });
        assert!(failed.is_err());

        // A failed build leaves the cell empty; the next access retries.
        let recovered = cell.obtain(SchedulerKind::Io, &hooks, || Ok(inline()));
        assert!(recovered.is_ok());
    }

    #[test]
    fn test_shared_accessor_applies_global_override() {
        let _guard = crate::hooks::testing::global_lock();

        let redirect = inline();
        let target = redirect.clone();
        crate::hooks::global()
            .set_scheduler_hook(SchedulerKind::Compute, move |_current| target.clone())
            .unwrap();

        let scheduler = compute().unwrap();
        assert!(Arc::ptr_eq(&scheduler, &redirect));

        crate::hooks::global()
            .clear_scheduler_hook(SchedulerKind::Compute)
            .unwrap();
    }
}
