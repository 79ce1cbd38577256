//! Signals computed from other signals.
//!
//! A derived signal owns a strong handle to its source plus the id of the
//! forwarding handler it installed there. When the last handle to the
//! derived signal is dropped, that link is dropped too and the forwarding
//! handler is removed from the source right away. The forwarding handler
//! itself only holds a weak reference, and returns [`Flow::Stop`] if a
//! delivery that was already in flight finds the derived signal gone.

use super::{Flow, Link, Signal, SubscriptionId};
use std::sync::Arc;

/// Keeps a source alive and detaches from it on drop.
struct Upstream<T: Clone + Send + 'static> {
    source: Signal<T>,
    id: SubscriptionId,
}

impl<T: Clone + Send + 'static> Link for Upstream<T> {}

impl<T: Clone + Send + 'static> Drop for Upstream<T> {
    fn drop(&mut self) {
        self.source.unsubscribe(self.id);
    }
}

impl<T: Clone + Send + 'static> Signal<T> {
    /// A signal carrying `f(value)` for every value published here.
    pub fn map<U, F>(&self, f: F) -> Signal<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.derive(move |value| Some(f(value)))
    }

    /// A signal carrying only the values that satisfy `predicate`.
    pub fn filter<P>(&self, predicate: P) -> Signal<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.derive(move |value| predicate(&value).then_some(value))
    }

    /// A signal carrying `f(value)` whenever it is `Some`.
    pub fn filter_map<U, F>(&self, f: F) -> Signal<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        self.derive(f)
    }

    fn derive<U, F>(&self, f: F) -> Signal<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let derived = Signal::<U>::new();
        let target = Arc::downgrade(&derived.inner);

        let id = self.subscribe(move |value| {
            let forward = target.upgrade().map(|inner| (inner, f(value)));
            async move {
                match forward {
                    None => Ok(Flow::Stop),
                    Some((inner, Some(mapped))) => {
                        Signal { inner }.publish(mapped).await;
                        Ok(Flow::Continue)
                    }
                    Some((_, None)) => Ok(Flow::Continue),
                }
            }
        });

        let link: Box<dyn Link> = Box::new(Upstream {
            source: self.clone(),
            id,
        });
        // Freshly created, so the cell is always empty here.
        let _ = derived.inner.upstream.set(link);
        derived
    }
}
