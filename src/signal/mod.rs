//! Typed broadcast signals.
//!
//! A [`Signal<T>`] holds an ordered list of asynchronous handlers. Publishing
//! a value delivers it to every handler one after another: handler N+1 only
//! starts once handler N's future has completed. A handler decides after each
//! delivery whether it stays subscribed ([`Flow::Continue`]) or leaves
//! ([`Flow::Stop`]).
//!
//! Handlers that fail, either by returning `Err` or by panicking, are
//! reported to the process-wide fault hook (see [`set_fault_hook`]) and are
//! treated as if they had returned `Continue`. One broken subscriber can
//! neither block its siblings nor unsubscribe itself by failing.
//!
//! Derived signals ([`Signal::map`], [`Signal::filter`],
//! [`Signal::filter_map`]) keep their source alive and detach from it as soon
//! as the last handle to them is dropped.

mod derived;
mod fault;

pub use fault::{FaultHook, SignalFault, clear_fault_hook, set_fault_hook};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// What a handler wants after a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Stay subscribed.
    Continue,
    /// Unsubscribe after this delivery.
    Stop,
}

/// Output of a signal handler.
pub type SubscriberResult = anyhow::Result<Flow>;

type HandlerFuture = BoxFuture<'static, SubscriberResult>;
type DynHandler<T> = Arc<dyn Fn(T) -> HandlerFuture + Send + Sync>;

/// Identifies one subscription on one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Slot<T> {
    id: SubscriptionId,
    live: AtomicBool,
    handler: DynHandler<T>,
}

/// Anything a signal keeps alive on behalf of its subscribers.
trait Link: Send + Sync {}

struct Inner<T> {
    slots: Mutex<Vec<Arc<Slot<T>>>>,
    next_id: AtomicU64,
    /// Set once for derived signals; dropping it detaches from the source.
    upstream: OnceLock<Box<dyn Link>>,
}

/// A broadcast channel of `T` values.
///
/// Cloning a `Signal` yields another handle to the same channel.
pub struct Signal<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.inner.slots.lock().len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Signal<T> {
    /// Create a signal with no handlers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                upstream: OnceLock::new(),
            }),
        }
    }

    /// Subscribe a handler that chooses whether to stay after each value.
    pub fn subscribe<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SubscriberResult> + Send + 'static,
    {
        self.attach(Arc::new(move |value| handler(value).boxed()))
    }

    /// Subscribe a handler that stays until explicitly unsubscribed.
    pub fn subscribe_forever<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.subscribe(move |value| {
            let fut = handler(value);
            async move { fut.await.map(|()| Flow::Continue) }
        })
    }

    /// Subscribe a handler for the next value only.
    ///
    /// The handler runs at most once, even when publishes overlap.
    pub fn subscribe_once<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let fired = AtomicBool::new(false);
        self.subscribe(move |value| {
            let fut = (!fired.swap(true, Ordering::AcqRel)).then(|| handler(value));
            async move {
                if let Some(fut) = fut {
                    fut.await?;
                }
                Ok(Flow::Stop)
            }
        })
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    ///
    /// A handler removed while a publish is in flight is not invoked for the
    /// rest of that publish.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.remove(id)
    }

    /// Number of live handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Deliver `value` to every handler registered when the call starts.
    ///
    /// Handlers run sequentially in storage order; the returned future
    /// completes after the last one finishes.
    pub fn publish(&self, value: T) -> BoxFuture<'static, ()> {
        let inner = Arc::clone(&self.inner);
        async move {
            let snapshot: Vec<Arc<Slot<T>>> = inner.slots.lock().iter().cloned().collect();

            for slot in snapshot {
                if !slot.live.load(Ordering::Acquire) {
                    continue;
                }
                if deliver(&slot.handler, value.clone()).await == Flow::Stop {
                    inner.remove(slot.id);
                }
            }
        }
        .boxed()
    }

    /// Forward every value published here into `dest`.
    ///
    /// This is a strong link: `dest` stays alive as long as this signal
    /// does, and the link is only removed through [`Signal::unsubscribe`].
    pub fn propagate(&self, dest: &Signal<T>) -> SubscriptionId {
        let dest = dest.clone();
        self.subscribe_forever(move |value| {
            let publish = dest.publish(value);
            async move {
                publish.await;
                Ok(())
            }
        })
    }

    fn attach(&self, handler: DynHandler<T>) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.slots.lock().push(Arc::new(Slot {
            id,
            live: AtomicBool::new(true),
            handler,
        }));
        id
    }
}

impl<T> Inner<T> {
    /// Swap-remove the slot; survivors may change order.
    fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut slots = self.slots.lock();
            slots
                .iter()
                .position(|slot| slot.id == id)
                .map(|idx| slots.swap_remove(idx))
        };
        // Dropped outside the lock: a handler's captures may own signals.
        match removed {
            Some(slot) => {
                slot.live.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }
}

/// Run one handler, converting failures into faults.
async fn deliver<T>(handler: &DynHandler<T>, value: T) -> Flow {
    let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| handler(value))) {
        Ok(fut) => fut,
        Err(payload) => {
            fault::report(SignalFault::panicked(payload));
            return Flow::Continue;
        }
    };

    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(flow)) => flow,
        Ok(Err(error)) => {
            fault::report(SignalFault::Failed(error));
            Flow::Continue
        }
        Err(payload) => {
            fault::report(SignalFault::panicked(payload));
            Flow::Continue
        }
    }
}
