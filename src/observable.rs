//! Observables - push streams and mount-scoped subscription.
//!
//! The stream contract is deliberately tiny: anything that can hand values
//! to an observer and return an unsubscribe closure is an [`Observable`].
//! [`Subject`] is the bundled push stream; `spark_signals::Signal` qualifies
//! too, with subscribe implemented as an effect over `get()` so observers
//! receive the current value immediately and every change after it.
//!
//! [`observe_while_mounted`] bounds a subscription to the node's mounted
//! intervals: values emitted between an unmount and the next mount never
//! reach the callback.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, observe_while_mounted, trigger_mount, Subject};
//!
//! let messages: Subject<String> = Subject::new();
//! let node = create_node();
//!
//! let stop = observe_while_mounted(node, messages.clone(), false, |text: &String| {
//!     println!("received {text}");
//! });
//!
//! trigger_mount(node);
//! messages.emit(&"hello".to_string());
//! stop();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, effect};

use crate::effect::while_mounted;
use crate::lifecycle::Cleanup;
use crate::node::NodeHandle;

// =============================================================================
// Contract
// =============================================================================

/// Observer callback handed to [`Observable::subscribe`].
pub type Observer<T> = Rc<dyn Fn(&T)>;

/// A push-based source of values over time.
pub trait Observable<T> {
    /// Start delivering values to `observer`; the returned cleanup stops
    /// delivery.
    fn subscribe(&self, observer: Observer<T>) -> Cleanup;
}

impl<T, O: Observable<T> + ?Sized> Observable<T> for Rc<O> {
    fn subscribe(&self, observer: Observer<T>) -> Cleanup {
        (**self).subscribe(observer)
    }
}

// =============================================================================
// Subject
// =============================================================================

struct SubjectInner<T> {
    observers: Vec<(u64, Observer<T>)>,
    next_id: u64,
}

/// Plain push stream: values exist only at emit time, no current value.
///
/// Clones share the same observer registry. Emission iterates a snapshot, so
/// observers may subscribe/unsubscribe during a pass.
pub struct Subject<T> {
    inner: Rc<RefCell<SubjectInner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self { inner: Rc::new(RefCell::new(SubjectInner { observers: Vec::new(), next_id: 0 })) }
    }

    /// Push a value to every current observer.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Observer<T>> =
            self.inner.borrow().observers.iter().map(|(_, observer)| observer.clone()).collect();
        for observer in snapshot {
            observer(value);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl<T: 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Observer<T>) -> Cleanup {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, observer));
            id
        };

        let inner = self.inner.clone();
        Box::new(move || {
            inner.borrow_mut().observers.retain(|(observer_id, _)| *observer_id != id);
        })
    }
}

// =============================================================================
// Signals as observables
// =============================================================================

impl<T: Clone + PartialEq + 'static> Observable<T> for Signal<T> {
    /// Subscribe via an effect: the observer sees the current value
    /// immediately, then every change. Equal re-sets are absorbed by the
    /// signal itself.
    fn subscribe(&self, observer: Observer<T>) -> Cleanup {
        let signal = self.clone();
        let stop = effect(move || {
            let value = signal.get();
            observer(&value);
        });
        Box::new(stop)
    }
}

// =============================================================================
// Mount-scoped subscription
// =============================================================================

/// Subscribe to `stream` for the node's mounted intervals.
///
/// With `dedupe`, a value equal to the last delivered one is suppressed (the
/// first delivery always passes). The last-delivered marker survives
/// unmount/remount, so a remount does not re-deliver an unchanged value.
pub fn observe_while_mounted<T, O>(
    handle: NodeHandle,
    stream: O,
    dedupe: bool,
    on_change: impl Fn(&T) + 'static,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    O: Observable<T> + 'static,
{
    let observer: Observer<T> = if dedupe {
        let last: RefCell<Option<T>> = RefCell::new(None);
        Rc::new(move |value: &T| {
            let fresh = {
                let mut last = last.borrow_mut();
                if last.as_ref() == Some(value) {
                    false
                } else {
                    *last = Some(value.clone());
                    true
                }
            };
            if fresh {
                on_change(value);
            }
        })
    } else {
        Rc::new(move |value: &T| on_change(value))
    };

    while_mounted(handle, move || stream.subscribe(observer.clone()))
}
