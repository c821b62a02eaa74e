//! Last-value-cached observer relay
//!
//! A small publish/subscribe primitive carrying immutable snapshots.
//! Subscribers are notified in subscription order; a new subscriber
//! immediately receives the cached last value, if any. Each subscription is
//! owned by exactly one component through its [`Subscription`] handle and is
//! released when that handle drops.

use std::sync::{Arc, Mutex};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct RelayInner<T> {
    observers: Vec<(u64, Observer<T>)>,
    last: Option<T>,
    next_id: u64,
}

/// A publish/subscribe relay with last-value-cached semantics
#[derive(Clone)]
pub struct Relay<T> {
    inner: Arc<Mutex<RelayInner<T>>>,
}

impl<T: Clone> Default for Relay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Relay<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RelayInner {
                observers: Vec::new(),
                last: None,
                next_id: 0,
            })),
        }
    }

    /// Register an observer. It first receives the cached value, then every
    /// subsequent publication, in subscription order relative to its peers.
    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription<T> {
        let observer: Observer<T> = Arc::new(observer);
        let id = {
            let mut inner = self.inner.lock().expect("relay lock poisoned");
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, observer.clone()));
            if let Some(last) = inner.last.clone() {
                drop(inner);
                observer(&last);
                return Subscription {
                    relay: Arc::clone(&self.inner),
                    id,
                };
            }
            id
        };
        Subscription {
            relay: Arc::clone(&self.inner),
            id,
        }
    }

    /// Publish a snapshot to all observers in subscription order
    pub fn publish(&self, value: T) {
        let observers = {
            let mut inner = self.inner.lock().expect("relay lock poisoned");
            inner.last = Some(value.clone());
            inner.observers.clone()
        };
        for (_, observer) in observers {
            observer(&value);
        }
    }

    /// The cached last value
    pub fn last(&self) -> Option<T> {
        self.inner.lock().expect("relay lock poisoned").last.clone()
    }
}

/// Scoped subscription handle; dropping it unsubscribes the observer
pub struct Subscription<T> {
    relay: Arc<Mutex<RelayInner<T>>>,
    id: u64,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.relay.lock() {
            inner.observers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_new_subscriber_receives_cached_value() {
        let relay = Relay::new();
        relay.publish(7_u32);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = relay.subscribe(move |v| sink.lock().unwrap().push(*v));
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let relay = Relay::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = relay.subscribe(move |_: &u32| first.lock().unwrap().push("a"));
        let second = Arc::clone(&order);
        let _b = relay.subscribe(move |_: &u32| second.lock().unwrap().push("b"));

        relay.publish(1);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let relay = Relay::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let sub = relay.subscribe(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        relay.publish(1);
        drop(sub);
        relay.publish(2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
