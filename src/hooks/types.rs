//! Hook slot types
//!
//! One signature alias per extension-point category and the `Slot` storage
//! cell the registry is built from. Transform hooks take the value the
//! runtime was about to use and return the value to use instead; the error
//! hook consumes an error and returns nothing.

use std::error::Error;
use std::sync::{Arc, PoisonError, RwLock};

use crate::flow::{FlowRef, SubscriberRef};
use crate::scheduler::{SchedulerRef, Task};

/// Transform applied to every pipeline at assembly time
pub type AssemblyHook = dyn Fn(FlowRef) -> FlowRef + Send + Sync;

/// Transform applied to every observer at subscription time
pub type SubscribeHook = dyn Fn(SubscriberRef) -> SubscriberRef + Send + Sync;

/// Transform applied to every unit of work handed to a scheduler
pub type ScheduleHook = dyn Fn(Task) -> Task + Send + Sync;

/// Transform applied to a scheduler instance (init and override slots)
pub type SchedulerHook = dyn Fn(SchedulerRef) -> SchedulerRef + Send + Sync;

/// Consumer for errors the runtime could not deliver to any observer
pub type ErrorHook = dyn Fn(&(dyn Error + Send + Sync)) + Send + Sync;

/// A single hook slot: an independently atomic reference holding at most
/// one installed override.
///
/// The lock is held only for the pointer load/store; installed hooks always
/// execute outside of it, so a slow hook never blocks readers or writers of
/// any slot.
pub(crate) struct Slot<F: ?Sized> {
    hook: RwLock<Option<Arc<F>>>,
}

impl<F: ?Sized> Slot<F> {
    pub(crate) const fn empty() -> Self {
        Self {
            hook: RwLock::new(None),
        }
    }

    /// Current override, if any.
    pub(crate) fn load(&self) -> Option<Arc<F>> {
        self.hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace (or clear) the override. Last write wins.
    pub(crate) fn store(&self, hook: Option<Arc<F>>) {
        *self.hook.write().unwrap_or_else(PoisonError::into_inner) = hook;
    }
}
