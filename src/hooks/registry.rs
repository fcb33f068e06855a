//! Runtime hook registry
//!
//! Contains:
//! - `RuntimeHooks` - the slot store, lockdown gate, and invocation wrappers
//! - `global()` - the process-wide registry the runtime's own seams consult
//!
//! Every slot holds at most one override; installing a new one replaces the
//! previous one outright. Invocation wrappers run overrides synchronously on
//! the calling thread and hand back whatever the override returns, unchecked.
//! Only the undeliverable-error path contains failures of its own hook; a
//! panicking transform hook propagates to whoever invoked the wrapper.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{panic_message, BoxError, RuntimeError, RuntimeResult};
use crate::flow::{FlowRef, SubscriberRef};
use crate::scheduler::{SchedulerKind, SchedulerRef, Task};

use super::types::{
    AssemblyHook, ErrorHook, ScheduleHook, SchedulerHook, Slot, SubscribeHook,
};

/// Registry of runtime extension points.
///
/// One instance covers the whole process (see [`global`]); private instances
/// exist so tests can exercise hook semantics in isolation. Any thread may
/// read any slot at any time; mutation is only permitted while the registry
/// is not locked down.
pub struct RuntimeHooks {
    lockdown: AtomicBool,
    assembly: Slot<AssemblyHook>,
    subscribe: Slot<SubscribeHook>,
    schedule: Slot<ScheduleHook>,
    scheduler_init: [Slot<SchedulerHook>; 3],
    scheduler_override: [Slot<SchedulerHook>; 3],
    error_handler: Slot<ErrorHook>,
}

static GLOBAL: RuntimeHooks = RuntimeHooks::new();

/// The process-wide hook registry.
///
/// The runtime's own seams (pipeline assembly, subscription, the shared
/// schedulers) consult this instance; host start-up code configures it and
/// then typically calls [`RuntimeHooks::lockdown`].
pub fn global() -> &'static RuntimeHooks {
    &GLOBAL
}

impl RuntimeHooks {
    /// Create a registry with every slot empty and the gate open.
    pub const fn new() -> Self {
        Self {
            lockdown: AtomicBool::new(false),
            assembly: Slot::empty(),
            subscribe: Slot::empty(),
            schedule: Slot::empty(),
            scheduler_init: [Slot::empty(), Slot::empty(), Slot::empty()],
            scheduler_override: [Slot::empty(), Slot::empty(), Slot::empty()],
            error_handler: Slot::empty(),
        }
    }

    // === Lockdown gate ===

    /// Permanently forbid further hook changes.
    ///
    /// Idempotent. Containers and host processes call this once after
    /// installing their hooks so that later-loaded code can't silently
    /// reroute errors or schedulers.
    pub fn lockdown(&self) {
        if !self.lockdown.swap(true, Ordering::SeqCst) {
            tracing::debug!("[RuntimeHooks] Locked down, hooks are now frozen");
        }
    }

    /// Whether the registry has been locked down.
    pub fn is_locked_down(&self) -> bool {
        self.lockdown.load(Ordering::SeqCst)
    }

    /// Reopen the gate. Exists solely so tests can restore isolation
    /// between cases; production callers never see it.
    #[cfg(test)]
    pub(crate) fn unlock(&self) {
        self.lockdown.store(false, Ordering::SeqCst);
    }

    /// Gate check shared by every mutating operation. The slot write that
    /// follows a passing check may race a concurrent `lockdown()`; the slot
    /// still ends up either fully written or untouched.
    fn guarded_store<F: ?Sized>(
        &self,
        slot: &Slot<F>,
        name: &str,
        hook: Option<Arc<F>>,
    ) -> RuntimeResult<()> {
        if self.is_locked_down() {
            return Err(RuntimeError::HooksLocked);
        }
        let installing = hook.is_some();
        slot.store(hook);
        if installing {
            tracing::debug!("[RuntimeHooks] Installed {} hook", name);
        } else {
            tracing::debug!("[RuntimeHooks] Cleared {} hook", name);
        }
        Ok(())
    }

    // === Assembly hook ===

    /// Install the pipeline-assembly hook.
    pub fn set_assembly_hook<F>(&self, hook: F) -> RuntimeResult<()>
    where
        F: Fn(FlowRef) -> FlowRef + Send + Sync + 'static,
    {
        self.guarded_store(&self.assembly, "assembly", Some(Arc::new(hook)))
    }

    /// Remove the pipeline-assembly hook.
    pub fn clear_assembly_hook(&self) -> RuntimeResult<()> {
        self.guarded_store(&self.assembly, "assembly", None)
    }

    /// Currently installed pipeline-assembly hook, if any.
    pub fn assembly_hook(&self) -> Option<Arc<AssemblyHook>> {
        self.assembly.load()
    }

    /// Called when a new pipeline is constructed. Returns the pipeline to
    /// expose: the input unchanged, or whatever the installed hook returns.
    pub fn on_assembly(&self, flow: FlowRef) -> FlowRef {
        match self.assembly.load() {
            Some(hook) => hook(flow),
            None => flow,
        }
    }

    // === Subscribe hook ===

    /// Install the subscription hook.
    pub fn set_subscribe_hook<F>(&self, hook: F) -> RuntimeResult<()>
    where
        F: Fn(SubscriberRef) -> SubscriberRef + Send + Sync + 'static,
    {
        self.guarded_store(&self.subscribe, "subscribe", Some(Arc::new(hook)))
    }

    /// Remove the subscription hook.
    pub fn clear_subscribe_hook(&self) -> RuntimeResult<()> {
        self.guarded_store(&self.subscribe, "subscribe", None)
    }

    /// Currently installed subscription hook, if any.
    pub fn subscribe_hook(&self) -> Option<Arc<SubscribeHook>> {
        self.subscribe.load()
    }

    /// Called when an observer subscribes. Returns the observer the
    /// pipeline should actually deliver to.
    pub fn on_subscribe(&self, subscriber: SubscriberRef) -> SubscriberRef {
        match self.subscribe.load() {
            Some(hook) => hook(subscriber),
            None => subscriber,
        }
    }

    // === Schedule hook ===

    /// Install the task-scheduling hook.
    pub fn set_schedule_hook<F>(&self, hook: F) -> RuntimeResult<()>
    where
        F: Fn(Task) -> Task + Send + Sync + 'static,
    {
        self.guarded_store(&self.schedule, "schedule", Some(Arc::new(hook)))
    }

    /// Remove the task-scheduling hook.
    pub fn clear_schedule_hook(&self) -> RuntimeResult<()> {
        self.guarded_store(&self.schedule, "schedule", None)
    }

    /// Currently installed task-scheduling hook, if any.
    pub fn schedule_hook(&self) -> Option<Arc<ScheduleHook>> {
        self.schedule.load()
    }

    /// Called when a unit of work is handed to a scheduler. Returns the
    /// task to queue in its place.
    pub fn on_schedule(&self, task: Task) -> Task {
        match self.schedule.load() {
            Some(hook) => hook(task),
            None => task,
        }
    }

    // === Scheduler hooks, one init and one override slot per kind ===

    /// Install the construction-time hook for `kind`.
    ///
    /// Consulted exactly once, when the shared scheduler singleton for
    /// `kind` is first built; its result is what gets installed.
    pub fn set_scheduler_init_hook<F>(&self, kind: SchedulerKind, hook: F) -> RuntimeResult<()>
    where
        F: Fn(SchedulerRef) -> SchedulerRef + Send + Sync + 'static,
    {
        self.guarded_store(
            &self.scheduler_init[kind.index()],
            &format!("{} scheduler init", kind),
            Some(Arc::new(hook)),
        )
    }

    /// Remove the construction-time hook for `kind`.
    pub fn clear_scheduler_init_hook(&self, kind: SchedulerKind) -> RuntimeResult<()> {
        self.guarded_store(
            &self.scheduler_init[kind.index()],
            &format!("{} scheduler init", kind),
            None,
        )
    }

    /// Currently installed construction-time hook for `kind`, if any.
    pub fn scheduler_init_hook(&self, kind: SchedulerKind) -> Option<Arc<SchedulerHook>> {
        self.scheduler_init[kind.index()].load()
    }

    /// Called once when the shared scheduler for `kind` is first built.
    /// Returns the scheduler to install as the singleton.
    pub fn init_scheduler(&self, kind: SchedulerKind, default: SchedulerRef) -> SchedulerRef {
        match self.scheduler_init[kind.index()].load() {
            Some(hook) => hook(default),
            None => default,
        }
    }

    /// Install the per-access hook for `kind`.
    ///
    /// Consulted on every request for the shared scheduler of `kind`, so a
    /// host can redirect scheduler usage without touching the singleton.
    pub fn set_scheduler_hook<F>(&self, kind: SchedulerKind, hook: F) -> RuntimeResult<()>
    where
        F: Fn(SchedulerRef) -> SchedulerRef + Send + Sync + 'static,
    {
        self.guarded_store(
            &self.scheduler_override[kind.index()],
            &format!("{} scheduler", kind),
            Some(Arc::new(hook)),
        )
    }

    /// Remove the per-access hook for `kind`.
    pub fn clear_scheduler_hook(&self, kind: SchedulerKind) -> RuntimeResult<()> {
        self.guarded_store(
            &self.scheduler_override[kind.index()],
            &format!("{} scheduler", kind),
            None,
        )
    }

    /// Currently installed per-access hook for `kind`, if any.
    pub fn scheduler_hook(&self, kind: SchedulerKind) -> Option<Arc<SchedulerHook>> {
        self.scheduler_override[kind.index()].load()
    }

    /// Called on every request for the shared scheduler of `kind`. Returns
    /// the scheduler to hand back for this call.
    pub fn on_scheduler(&self, kind: SchedulerKind, scheduler: SchedulerRef) -> SchedulerRef {
        match self.scheduler_override[kind.index()].load() {
            Some(hook) => hook(scheduler),
            None => scheduler,
        }
    }

    // === Undeliverable-error path ===

    /// Install the undeliverable-error handler.
    pub fn set_error_hook<F>(&self, hook: F) -> RuntimeResult<()>
    where
        F: Fn(&(dyn std::error::Error + Send + Sync)) + Send + Sync + 'static,
    {
        self.guarded_store(&self.error_handler, "error", Some(Arc::new(hook)))
    }

    /// Remove the undeliverable-error handler.
    pub fn clear_error_hook(&self) -> RuntimeResult<()> {
        self.guarded_store(&self.error_handler, "error", None)
    }

    /// Currently installed undeliverable-error handler, if any.
    pub fn error_hook(&self) -> Option<Arc<ErrorHook>> {
        self.error_handler.load()
    }

    /// Report an error the runtime could not deliver to any observer.
    ///
    /// This is the terminal error sink and never panics:
    /// - `None` is replaced by a synthesized [`RuntimeError::MissingError`].
    /// - With no handler installed, the error goes to the default
    ///   uncaught-error channel (a `tracing` error event).
    /// - With a handler installed, the handler consumes the error. If the
    ///   handler itself panics, the panic is contained and the original
    ///   error is surfaced with the panic payload attached as a secondary
    ///   cause.
    pub fn on_undeliverable(&self, error: Option<BoxError>) {
        let error = error.unwrap_or_else(|| Box::new(RuntimeError::MissingError));

        let Some(hook) = self.error_handler.load() else {
            surface(error.as_ref(), None);
            return;
        };

        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook(error.as_ref()))) {
            surface(error.as_ref(), Some(&panic_message(payload.as_ref())));
        }
    }

    // === Reset ===

    /// Clear every slot back to absent.
    ///
    /// Reset is itself a mutation and fails with
    /// [`RuntimeError::HooksLocked`], changing nothing, once the registry
    /// is locked down.
    pub fn reset(&self) -> RuntimeResult<()> {
        if self.is_locked_down() {
            return Err(RuntimeError::HooksLocked);
        }
        self.assembly.store(None);
        self.subscribe.store(None);
        self.schedule.store(None);
        for slot in &self.scheduler_init {
            slot.store(None);
        }
        for slot in &self.scheduler_override {
            slot.store(None);
        }
        self.error_handler.store(None);
        tracing::debug!("[RuntimeHooks] All hooks cleared");
        Ok(())
    }
}

impl Default for RuntimeHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit an undeliverable error on the default uncaught-error channel.
fn surface(error: &(dyn std::error::Error + Send + Sync), handler_failure: Option<&str>) {
    match handler_failure {
        Some(cause) => tracing::error!(
            error = %error,
            handler_failure = %cause,
            "[RuntimeHooks] Undeliverable error (handler panicked)"
        ),
        None => tracing::error!(error = %error, "[RuntimeHooks] Undeliverable error"),
    }
}

impl fmt::Debug for RuntimeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let init: Vec<bool> = self.scheduler_init.iter().map(|s| s.load().is_some()).collect();
        let overrides: Vec<bool> = self
            .scheduler_override
            .iter()
            .map(|s| s.load().is_some())
            .collect();
        f.debug_struct("RuntimeHooks")
            .field("lockdown", &self.is_locked_down())
            .field("assembly", &self.assembly.load().is_some())
            .field("subscribe", &self.subscribe.load().is_some())
            .field("schedule", &self.schedule.load().is_some())
            .field("scheduler_init", &init)
            .field("scheduler_override", &overrides)
            .field("error_handler", &self.error_handler.load().is_some())
            .finish()
    }
}
