//! Collection-change observation for scene and entity containers.
//!
//! Structural edits on an observed container synchronously produce the
//! corresponding [`ListChange`] before the edit call returns; there is no
//! deferred or batched delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A structural change to an observed ordered collection.
#[derive(Debug, Clone)]
pub enum ListChange<T> {
    /// An item was inserted at `index`.
    Added {
        /// Position of the new item.
        index: usize,
        /// The inserted item.
        item: T,
    },
    /// An item was removed from `index`.
    Removed {
        /// Position the item previously occupied.
        index: usize,
        /// The removed item.
        item: T,
    },
    /// The item at `index` was exchanged for another. Semantically a removal
    /// of `old` followed by an addition of `new`.
    Replaced {
        /// Position of the exchanged slot.
        index: usize,
        /// The item previously at `index`.
        old: T,
        /// The item now at `index`.
        new: T,
    },
    /// An item changed position. Membership is unchanged.
    Moved {
        /// Previous position.
        from: usize,
        /// New position.
        to: usize,
        /// The moved item.
        item: T,
    },
    /// The collection was cleared. Carries the previous membership snapshot
    /// in index order, so observers can treat it as a removal of every item.
    Reset {
        /// Items present before the clear, in index order.
        removed: Vec<T>,
    },
}

/// Observer of [`ListChange`] events.
pub trait CollectionObserver<T>: Send + Sync {
    /// Called synchronously for every structural edit on the subscribed
    /// container.
    fn changed(&self, change: &ListChange<T>);
}

/// Identifier returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber list shared by the observable containers.
pub(crate) struct Subscribers<T> {
    next_id: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn CollectionObserver<T>>)>>,
}

impl<T> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, observer: Arc<dyn CollectionObserver<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().unwrap().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock().unwrap();
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    /// Deliver a change to every subscriber registered at the time of the
    /// call. The subscriber list lock is not held during delivery, so
    /// observers are free to subscribe or unsubscribe from their callback.
    pub(crate) fn notify(&self, change: &ListChange<T>) {
        let snapshot: Vec<_> = self
            .observers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in snapshot {
            observer.changed(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collector {
        seen: Mutex<Vec<String>>,
    }

    impl CollectionObserver<u32> for Collector {
        fn changed(&self, change: &ListChange<u32>) {
            let tag = match change {
                ListChange::Added { item, .. } => format!("add {item}"),
                ListChange::Removed { item, .. } => format!("remove {item}"),
                ListChange::Replaced { old, new, .. } => format!("replace {old}->{new}"),
                ListChange::Moved { item, .. } => format!("move {item}"),
                ListChange::Reset { removed } => format!("reset {}", removed.len()),
            };
            self.seen.lock().unwrap().push(tag);
        }
    }

    #[test]
    fn test_notify_reaches_all_subscribers() {
        let subscribers = Subscribers::new();
        let a = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        let b = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        subscribers.subscribe(a.clone());
        subscribers.subscribe(b.clone());

        subscribers.notify(&ListChange::Added { index: 0, item: 7 });

        assert_eq!(*a.seen.lock().unwrap(), vec!["add 7"]);
        assert_eq!(*b.seen.lock().unwrap(), vec!["add 7"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let subscribers = Subscribers::new();
        let collector = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        let id = subscribers.subscribe(collector.clone());

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));

        subscribers.notify(&ListChange::Removed { index: 0, item: 3 });
        assert!(collector.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_carries_previous_membership() {
        let subscribers = Subscribers::new();
        let collector = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        subscribers.subscribe(collector.clone());

        subscribers.notify(&ListChange::Reset {
            removed: vec![1, 2, 3],
        });
        assert_eq!(*collector.seen.lock().unwrap(), vec!["reset 3"]);
    }
}
