//! Observer list for samples emitted by one engine.
//!
//! Publishing snapshots the listener list under a read lock and releases the
//! lock before invoking callbacks, so a callback may subscribe or unsubscribe
//! without deadlocking. Each listener carries an `active` flag that is checked
//! immediately before delivery.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use crate::sample::Sample;

type Callback = Box<dyn Fn(&Sample) + Send + Sync>;

struct Listener {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

struct InnerBus {
    listeners: RwLock<Vec<Arc<Listener>>>,
    next_id: AtomicU64,
}

impl InnerBus {
    fn detach(&self, id: u64) {
        let mut listeners = self.listeners.write();
        if let Some(pos) = listeners.iter().position(|l| l.id == id) {
            let listener = listeners.remove(pos);
            listener.active.store(false, Ordering::Release);
        }
    }
}

/// Shared, thread-safe sample bus.
#[derive(Clone)]
pub struct SampleBus {
    inner: Arc<InnerBus>,
}

impl Default for SampleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InnerBus {
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a new handle to the same bus.
    #[inline]
    pub fn share(&self) -> Self {
        self.clone()
    }

    /// Registers `callback`; it stays attached until the returned
    /// [`Subscription`] is dropped or explicitly unsubscribed.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Sample) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let listener = Arc::new(Listener {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        });
        self.inner.listeners.write().push(listener);
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `sample` to every currently attached listener, in order.
    ///
    /// Returns how many listeners received it.
    pub fn publish(&self, sample: &Sample) -> usize {
        let snapshot: Vec<Arc<Listener>> = self.inner.listeners.read().clone();
        let mut delivered = 0;
        for listener in snapshot {
            if !listener.active.load(Ordering::Acquire) {
                trace!(listener = listener.id, "skipping detached listener");
                continue;
            }
            (listener.callback)(sample);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

/// Handle to an attached listener. Dropping it detaches the listener.
pub struct Subscription {
    id: u64,
    bus: Weak<InnerBus>,
}

impl Subscription {
    /// Detaches the listener now.
    pub fn unsubscribe(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.detach(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::tests::sample_at;
    use parking_lot::Mutex;

    #[test]
    fn delivers_in_emission_order() {
        let bus = SampleBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe(move |s| sink.lock().push(s.timestamp));

        for ts in [10, 20, 30] {
            bus.publish(&sample_at(ts));
        }
        assert_eq!(*seen.lock(), vec![10, 20, 30]);
    }

    #[test]
    fn listeners_notified_in_subscription_order() {
        let bus = SampleBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let a = order.clone();
        let b = order.clone();
        let _first = bus.subscribe(move |_| a.lock().push("first"));
        let _second = bus.subscribe(move |_| b.lock().push("second"));

        assert_eq!(bus.publish(&sample_at(1)), 2);
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let bus = SampleBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        bus.publish(&sample_at(1));
        sub.unsubscribe();
        bus.publish(&sample_at(2));

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn listener_detached_mid_notification_misses_in_flight_sample() {
        let bus = SampleBus::new();
        let victim_hits = Arc::new(AtomicU64::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let detach_slot = slot.clone();
        let _killer = bus.subscribe(move |_| {
            detach_slot.lock().take();
        });

        let hits = victim_hits.clone();
        let victim = bus.subscribe(move |_| {
            hits.fetch_add(1, Ordering::Relaxed);
        });
        *slot.lock() = Some(victim);

        assert_eq!(bus.publish(&sample_at(1)), 1);
        assert_eq!(victim_hits.load(Ordering::Relaxed), 0);
    }
}
