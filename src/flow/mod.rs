//! Stream pipeline seam
//!
//! The minimal pipeline/observer surface the hook registry intercepts:
//! - `Flow` / `Subscriber` - object-safe pipeline and observer traits
//! - `assemble` / `subscribe` - entry points that route through the hooks
//! - `VecFlow` / `StreamFlow` - concrete sources
//!
//! Operator machinery lives with the host; this module only defines the
//! interception contract. A pipeline built by host code goes through
//! [`assemble`] exactly once before being exposed, and every observer goes
//! through [`subscribe`] on its way to the pipeline.

mod sources;
mod types;

pub use sources::{StreamFlow, VecFlow};
pub use types::{Flow, FlowRef, Item, Subscriber, SubscriberRef};

use crate::hooks;

/// Route a freshly built pipeline through the assembly hook.
///
/// Returns the pipeline to expose to callers, which may be a different
/// pipeline entirely if an assembly hook is installed.
pub fn assemble(flow: FlowRef) -> FlowRef {
    hooks::global().on_assembly(flow)
}

/// Subscribe `subscriber` to `flow`.
///
/// The subscriber is routed through the subscribe hook first, so the
/// pipeline may see a wrapping observer instead of the original.
pub fn subscribe(flow: &FlowRef, subscriber: SubscriberRef) {
    let subscriber = hooks::global().on_subscribe(subscriber);
    flow.subscribe_raw(subscriber);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::core::BoxError;
    use crate::hooks;

    struct EmptyFlow;

    impl Flow for EmptyFlow {
        fn subscribe_raw(&self, subscriber: SubscriberRef) {
            subscriber.on_complete();
        }
    }

    struct CountingSubscriber {
        completions: AtomicUsize,
    }

    impl Subscriber for CountingSubscriber {
        fn on_next(&self, _item: Item) {}
        fn on_error(&self, _error: BoxError) {}
        fn on_complete(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_assemble_substitutes_pipeline() {
        let _guard = hooks::testing::global_lock();

        let replacement: FlowRef = Arc::new(EmptyFlow);
        let installed = replacement.clone();
        hooks::global()
            .set_assembly_hook(move |_flow| installed.clone())
            .unwrap();

        let original: FlowRef = Arc::new(EmptyFlow);
        let exposed = assemble(original);
        assert!(Arc::ptr_eq(&exposed, &replacement));

        hooks::global().clear_assembly_hook().unwrap();
    }

    #[test]
    fn test_subscribe_routes_observer_through_hook() {
        let _guard = hooks::testing::global_lock();

        // Wrapper that forwards completion to both the original subscriber
        // and a shared counter.
        struct Tee {
            inner: SubscriberRef,
            extra: Arc<CountingSubscriber>,
        }

        impl Subscriber for Tee {
            fn on_next(&self, item: Item) {
                self.inner.on_next(item);
            }
            fn on_error(&self, error: BoxError) {
                self.inner.on_error(error);
            }
            fn on_complete(&self) {
                self.inner.on_complete();
                self.extra.on_complete();
            }
        }

        let extra = Arc::new(CountingSubscriber {
            completions: AtomicUsize::new(0),
        });
        let hook_extra = extra.clone();
        hooks::global()
            .set_subscribe_hook(move |inner| {
                Arc::new(Tee {
                    inner,
                    extra: hook_extra.clone(),
                })
            })
            .unwrap();

        let flow: FlowRef = Arc::new(EmptyFlow);
        let direct = Arc::new(CountingSubscriber {
            completions: AtomicUsize::new(0),
        });
        subscribe(&flow, direct.clone());

        assert_eq!(direct.completions.load(Ordering::SeqCst), 1);
        assert_eq!(extra.completions.load(Ordering::SeqCst), 1);

        hooks::global().clear_subscribe_hook().unwrap();
    }
}
