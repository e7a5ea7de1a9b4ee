//! Single-threaded observer list with RAII subscriptions.
//!
//! Both directions of the change stream use this: every section owns a
//! `Notifier<ListChange>` that its relay subscribes to, and the joined surface
//! owns a `Notifier<JoinedChange>` that the rendering surface subscribes to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

type Observer<E> = Rc<dyn Fn(&E)>;

struct ObserverList<E> {
    observers: Vec<(u64, Observer<E>)>,
    next_id: u64,
}

/// Type-erased handle used by [`Subscription`] to detach itself.
trait Detach {
    fn detach(&self, id: u64);
}

impl<E> Detach for RefCell<ObserverList<E>> {
    fn detach(&self, id: u64) {
        self.borrow_mut().observers.retain(|(observer_id, _)| *observer_id != id);
    }
}

/// Delivers events of type `E` to subscribed observers, in subscription order.
pub struct Notifier<E> {
    list: Rc<RefCell<ObserverList<E>>>,
}

impl<E: 'static> Notifier<E> {
    pub fn new() -> Self {
        Self {
            list: Rc::new(RefCell::new(ObserverList {
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Registers `observer`. It stays registered until the returned
    /// [`Subscription`] is dropped or cancelled.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: impl Fn(&E) + 'static) -> Subscription {
        let mut list = self.list.borrow_mut();
        let id = list.next_id;
        list.next_id += 1;
        list.observers.push((id, Rc::new(observer)));
        let detach: Weak<dyn Detach> = Rc::downgrade(&self.list) as Weak<dyn Detach>;
        Subscription {
            list: Some(detach),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.list.borrow().observers.len()
    }

    /// Delivers `event` to every observer registered when the call started.
    ///
    /// Observers may subscribe or unsubscribe from inside the callback; such
    /// changes take effect from the next event.
    pub fn notify(&self, event: &E) {
        let snapshot: SmallVec<[Observer<E>; 4]> = self
            .list
            .borrow()
            .observers
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            observer(event);
        }
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observer_count", &self.list.borrow().observers.len())
            .finish()
    }
}

/// Keeps an observer registered with a [`Notifier`] while alive.
pub struct Subscription {
    list: Option<Weak<dyn Detach>>,
    id: u64,
}

impl Subscription {
    /// Whether the notifier this subscription belongs to still exists.
    pub fn is_active(&self) -> bool {
        self.list
            .as_ref()
            .is_some_and(|list| list.strong_count() > 0)
    }

    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(list) = self.list.take().and_then(|weak| weak.upgrade()) {
            list.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn delivers_in_subscription_order() {
        let notifier = Notifier::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let seen = Rc::clone(&seen);
            notifier.subscribe(move |event| seen.borrow_mut().push(("first", *event)))
        };
        let second = {
            let seen = Rc::clone(&seen);
            notifier.subscribe(move |event| seen.borrow_mut().push(("second", *event)))
        };

        notifier.notify(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        drop((first, second));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let notifier = Notifier::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let subscription = {
            let hits = Rc::clone(&hits);
            notifier.subscribe(move |_| hits.set(hits.get() + 1))
        };
        notifier.notify(&());
        drop(subscription);
        notifier.notify(&());

        assert_eq!(hits.get(), 1);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn subscription_outliving_notifier_is_inactive() {
        let notifier = Notifier::<()>::new();
        let subscription = notifier.subscribe(|_| {});
        assert!(subscription.is_active());
        drop(notifier);
        assert!(!subscription.is_active());
        subscription.cancel();
    }

    #[test]
    fn observer_can_unsubscribe_itself_during_delivery() {
        let notifier = Rc::new(Notifier::<()>::new());
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));
        let subscription = {
            let slot = Rc::clone(&slot);
            let hits = Rc::clone(&hits);
            notifier.subscribe(move |_| {
                hits.set(hits.get() + 1);
                slot.borrow_mut().take();
            })
        };
        *slot.borrow_mut() = Some(subscription);

        notifier.notify(&());
        notifier.notify(&());

        assert_eq!(hits.get(), 1);
    }
}
