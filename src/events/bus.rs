//! Synchronous in-process publish/subscribe
//!
//! Handlers run on the publishing thread, in subscription order. The matching
//! handlers are cloned out of the lock before any of them runs, so a handler
//! may subscribe, unsubscribe, publish or query the store without
//! deadlocking, and changes it makes to the subscriber list only take effect
//! from the next publish.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::topic::Topic;

type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

/// Opaque token returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

struct Subscription {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Owned notification bus, shared with `Arc` by whoever needs it
#[derive(Default)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`; it stays active until unsubscribed
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionHandle
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscriptions.push(Subscription {
            id,
            topic,
            handler: Arc::new(handler),
        });
        debug!(%topic, subscription = id, "subscribed");
        SubscriptionHandle(id)
    }

    /// Remove a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut registry = self.lock();
        let before = registry.subscriptions.len();
        registry.subscriptions.retain(|s| s.id != handle.0);
        before != registry.subscriptions.len()
    }

    pub fn is_active(&self, handle: SubscriptionHandle) -> bool {
        self.lock().subscriptions.iter().any(|s| s.id == handle.0)
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.lock()
            .subscriptions
            .iter()
            .filter(|s| s.topic == topic)
            .count()
    }

    /// Deliver `topic` to its current subscribers.
    ///
    /// Returns how many handlers completed. A panicking handler is logged and
    /// skipped; the rest still run.
    pub fn publish(&self, topic: Topic) -> usize {
        let handlers: Vec<(u64, Handler)> = self
            .lock()
            .subscriptions
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| (s.id, Arc::clone(&s.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(topic))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    warn!(
                        %topic,
                        subscription = id,
                        reason = panic_message(&panic),
                        "notification handler panicked"
                    );
                }
            }
        }
        delivered
    }

    /// Publish an entity topic followed by [`Topic::AnyDataChanged`]
    pub fn publish_change(&self, topic: Topic) {
        self.publish(topic);
        if topic != Topic::AnyDataChanged {
            self.publish(Topic::AnyDataChanged);
        }
    }

    // Handlers never run under the lock, so poisoning only follows a panic in
    // this module's own bookkeeping; the registry is still consistent then.
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.lock().subscriptions.len())
            .finish()
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn test_publish_reaches_only_matching_topic() {
        let bus = EventBus::new();
        let expenses = counter();
        let products = counter();

        let e = Arc::clone(&expenses);
        bus.subscribe(Topic::Expenses, move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });
        let p = Arc::clone(&products);
        bus.subscribe(Topic::Products, move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(Topic::Expenses), 1);
        assert_eq!(expenses.load(Ordering::SeqCst), 1);
        assert_eq!(products.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            bus.subscribe(Topic::Transfers, move |_| order.lock().unwrap().push(i));
        }

        bus.publish(Topic::Transfers);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe_state_machine() {
        let bus = EventBus::new();
        let hits = counter();
        let h = Arc::clone(&hits);
        let handle = bus.subscribe(Topic::Providers, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.is_active(handle));
        assert!(bus.unsubscribe(handle));
        assert!(!bus.is_active(handle));
        assert!(!bus.unsubscribe(handle));

        bus.publish(Topic::Providers);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::new();
        let hits = counter();

        bus.subscribe(Topic::Categories, |_| panic!("broken view"));
        let h = Arc::clone(&hits);
        bus.subscribe(Topic::Categories, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(Topic::Categories), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // The bus is still usable afterwards
        assert_eq!(bus.publish(Topic::Categories), 1);
    }

    #[test]
    fn test_subscribe_and_unsubscribe_during_publish() {
        let bus = Arc::new(EventBus::new());
        let late_hits = counter();

        let self_handle: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));
        let inner_bus = Arc::clone(&bus);
        let inner_handle = Arc::clone(&self_handle);
        let inner_hits = Arc::clone(&late_hits);
        let handle = bus.subscribe(Topic::Couriers, move |_| {
            if let Some(h) = *inner_handle.lock().unwrap() {
                inner_bus.unsubscribe(h);
            }
            let hits = Arc::clone(&inner_hits);
            inner_bus.subscribe(Topic::Couriers, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        });
        *self_handle.lock().unwrap() = Some(handle);

        // The handler added during this publish is not called by it
        assert_eq!(bus.publish(Topic::Couriers), 1);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        assert!(!bus.is_active(handle));

        bus.publish(Topic::Couriers);
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_change_also_publishes_umbrella() {
        let bus = EventBus::new();
        let any = counter();
        let a = Arc::clone(&any);
        bus.subscribe(Topic::AnyDataChanged, move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish_change(Topic::CashDeposits);
        bus.publish_change(Topic::AnyDataChanged);
        assert_eq!(any.load(Ordering::SeqCst), 2);
        assert_eq!(bus.subscriber_count(Topic::AnyDataChanged), 1);
    }
}
