// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Observer registries
//!
//! Registration is append-only and may happen from inside a running
//! observer. Each dispatch works on a snapshot taken when it starts: entries
//! added meanwhile are not called for that dispatch but are kept for the
//! next one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::warn;

use crate::message::Message;

/// How long an observer stays registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Called for every dispatch until the connection finishes
    Each,
    /// Called for the next dispatch only
    Next,
}

type Observer<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Observers captured at the start of a dispatch
pub struct Snapshot<T: ?Sized> {
    observers: Vec<Observer<T>>,
    epoch: u64,
}

impl<T: ?Sized> Snapshot<T> {
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Ordered observers sharing one payload type and one lifetime
pub struct SubscriptionList<T: ?Sized> {
    lifetime: Lifetime,
    observers: RefCell<Vec<Observer<T>>>,
    // Bumped by `clear` so an in-flight dispatch never drains newer entries.
    epoch: Cell<u64>,
}

impl<T: ?Sized> SubscriptionList<T> {
    pub fn new(lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            observers: RefCell::new(Vec::new()),
            epoch: Cell::new(0),
        }
    }

    pub fn each() -> Self {
        Self::new(Lifetime::Each)
    }

    pub fn next() -> Self {
        Self::new(Lifetime::Next)
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn subscribe(&self, observer: impl FnMut(&T) + 'static) {
        let observer: Observer<T> = Rc::new(RefCell::new(observer));
        self.observers.borrow_mut().push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.epoch.set(self.epoch.get() + 1);
        self.observers.borrow_mut().clear();
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            observers: self.observers.borrow().clone(),
            epoch: self.epoch.get(),
        }
    }

    /// Invoke every observer in `snapshot`, in registration order
    ///
    /// A `Next` list then drops exactly the entries that were invoked. If
    /// the list is cleared meanwhile, the rest of the snapshot is skipped.
    /// Returns the number of observers in the snapshot.
    pub fn dispatch_snapshot(&self, snapshot: Snapshot<T>, payload: &T) -> usize {
        for observer in &snapshot.observers {
            if self.epoch.get() != snapshot.epoch {
                break;
            }
            match observer.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(payload),
                Err(_) => warn!("[REGISTRY] Observer re-entered its own dispatch, skipping"),
            }
        }

        if self.lifetime == Lifetime::Next && self.epoch.get() == snapshot.epoch {
            let mut observers = self.observers.borrow_mut();
            let served = snapshot.observers.len().min(observers.len());
            observers.drain(..served);
        }
        snapshot.observers.len()
    }

    pub fn dispatch(&self, payload: &T) -> usize {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return 0;
        }
        self.dispatch_snapshot(snapshot, payload)
    }
}

/// Observers called once when the connection finishes
#[derive(Default)]
pub struct FinishList {
    finished: Cell<bool>,
    observers: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl FinishList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; runs it immediately if already finished
    pub fn subscribe(&self, observer: impl FnOnce() + 'static) {
        if self.finished.get() {
            observer();
        } else {
            self.observers.borrow_mut().push(Box::new(observer));
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    /// Run every observer once; later calls do nothing
    pub fn fire(&self) -> bool {
        if self.finished.replace(true) {
            return false;
        }
        let observers = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in observers {
            observer();
        }
        true
    }
}

/// The five registries of a connection
pub struct CallbackRegistry {
    pub each_message: SubscriptionList<str>,
    pub next_message: SubscriptionList<str>,
    pub each_data: SubscriptionList<Message>,
    pub next_data: SubscriptionList<Message>,
    pub finish: FinishList,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            each_message: SubscriptionList::each(),
            next_message: SubscriptionList::next(),
            each_data: SubscriptionList::each(),
            next_data: SubscriptionList::next(),
            finish: FinishList::new(),
        }
    }

    pub fn has_text_observers(&self) -> bool {
        !self.each_message.is_empty() || !self.next_message.is_empty()
    }

    /// Drop every message and data observer
    pub fn clear_subscriptions(&self) {
        self.each_message.clear();
        self.next_message.clear();
        self.each_data.clear();
        self.next_data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnMut(&str)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move |payload: &str| sink.borrow_mut().push(format!("{}:{}", name, payload)))
                as Box<dyn FnMut(&str)>
        };
        (log, make)
    }

    #[test]
    fn test_each_list_persists() {
        let list = SubscriptionList::<str>::each();
        let (log, make) = recorder();
        list.subscribe(make("a"));
        list.subscribe(make("b"));

        list.dispatch("1");
        list.dispatch("2");

        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "a:2", "b:2"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_next_list_drains() {
        let list = SubscriptionList::<str>::next();
        let (log, make) = recorder();
        list.subscribe(make("a"));

        assert_eq!(list.dispatch("1"), 1);
        assert_eq!(list.dispatch("2"), 0);
        assert_eq!(*log.borrow(), vec!["a:1"]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_next_list_keeps_entries_added_during_dispatch() {
        let list = Rc::new(SubscriptionList::<str>::next());
        let (log, make) = recorder();

        let weak = Rc::downgrade(&list);
        let mut late = Some(make("late"));
        list.subscribe(move |_| {
            if let (Some(list), Some(observer)) = (weak.upgrade(), late.take()) {
                list.subscribe(observer);
            }
        });

        list.dispatch("1");
        assert_eq!(list.len(), 1);
        assert!(log.borrow().is_empty());

        list.dispatch("2");
        assert_eq!(*log.borrow(), vec!["late:2"]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_clear_during_dispatch_is_respected() {
        let list = Rc::new(SubscriptionList::<str>::next());
        let weak = Rc::downgrade(&list);
        list.subscribe(move |_| {
            if let Some(list) = weak.upgrade() {
                list.clear();
                list.subscribe(|_| {});
            }
        });

        list.dispatch("x");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear_stops_rest_of_snapshot() {
        let list = Rc::new(SubscriptionList::<str>::each());
        let (log, make) = recorder();

        let weak = Rc::downgrade(&list);
        list.subscribe(move |_| {
            if let Some(list) = weak.upgrade() {
                list.clear();
            }
        });
        list.subscribe(make("after"));

        assert_eq!(list.dispatch("x"), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_finish_fires_once_in_order() {
        let finish = FinishList::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            finish.subscribe(move || log.borrow_mut().push(i));
        }

        assert!(finish.fire());
        assert!(!finish.fire());
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_finish_subscribe_after_fire_runs_immediately() {
        let finish = FinishList::new();
        finish.fire();

        let hit = Rc::new(Cell::new(false));
        let flag = Rc::clone(&hit);
        finish.subscribe(move || flag.set(true));
        assert!(hit.get());
        assert!(finish.is_empty());
    }

    #[test]
    fn test_registry_text_observers() {
        let registry = CallbackRegistry::new();
        assert!(!registry.has_text_observers());
        registry.next_message.subscribe(|_| {});
        assert!(registry.has_text_observers());
        registry.clear_subscriptions();
        assert!(!registry.has_text_observers());
    }
}
