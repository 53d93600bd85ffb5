//! Static-or-stream resolution.
//!
//! Callers accept either a fixed value or a live stream through one call
//! site: [`MaybeObservable`] is the carrier (the reactive-prop enum,
//! stream-flavored), [`resolve`] normalizes it into change notifications,
//! [`resolve_nested`] follows a value that itself points at another
//! static-or-stream value, and [`to_signal`] turns the whole thing into a
//! latest-value container.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, resolve, MaybeObservable, Subject};
//!
//! let node = create_node();
//! let title: Subject<String> = Subject::new();
//!
//! // The same call site takes "Inbox" or a live stream of titles.
//! let stop = resolve(node, MaybeObservable::from(title.clone()), true, |t: &String| {
//!     println!("title: {t}");
//! }, false);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use crate::effect::while_mounted;
use crate::lifecycle::{Cleanup, MountState, mount_state, on_mount};
use crate::node::NodeHandle;
use crate::observable::{Observable, Subject, observe_while_mounted};

// =============================================================================
// Carrier
// =============================================================================

/// A value that is either fixed, a push stream, or a signal container.
///
/// The `Signal` variant is the "stream with a synchronously readable current
/// value" special case; [`to_signal`] passes it through unchanged.
pub enum MaybeObservable<T: Clone + PartialEq + 'static> {
    Static(T),
    Stream(Rc<dyn Observable<T>>),
    Signal(Signal<T>),
}

impl<T: Clone + PartialEq + 'static> MaybeObservable<T> {
    /// Wrap any observable as the stream variant.
    pub fn stream(observable: impl Observable<T> + 'static) -> Self {
        Self::Stream(Rc::new(observable))
    }
}

impl<T: Clone + PartialEq + 'static> Clone for MaybeObservable<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(value.clone()),
            Self::Stream(observable) => Self::Stream(observable.clone()),
            Self::Signal(signal) => Self::Signal(signal.clone()),
        }
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for MaybeObservable<T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for MaybeObservable<T> {
    fn from(signal: Signal<T>) -> Self {
        Self::Signal(signal)
    }
}

impl<T: Clone + PartialEq + 'static> From<Subject<T>> for MaybeObservable<T> {
    fn from(subject: Subject<T>) -> Self {
        Self::Stream(Rc::new(subject))
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Normalize `value` into change notifications on `on_change`.
///
/// Streams and signals delegate to
/// [`observe_while_mounted`](crate::observable::observe_while_mounted). A
/// static value is delivered synchronously right away - unless `lazy` is set
/// and the node is not currently mounted, in which case delivery waits for
/// the next mount, fires exactly once, and unregisters itself.
pub fn resolve<T>(
    handle: NodeHandle,
    value: MaybeObservable<T>,
    dedupe: bool,
    on_change: impl Fn(&T) + 'static,
    lazy: bool,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
{
    match value {
        MaybeObservable::Stream(stream) => observe_while_mounted(handle, stream, dedupe, on_change),
        MaybeObservable::Signal(signal) => observe_while_mounted(handle, signal, dedupe, on_change),
        MaybeObservable::Static(value) => {
            if lazy && mount_state(handle) != MountState::Mounted {
                let pending: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
                let unregister = pending.clone();
                let stop = on_mount(handle, move || {
                    let stop = unregister.borrow_mut().take();
                    if let Some(stop) = stop {
                        stop();
                    }
                    on_change(&value);
                });
                *pending.borrow_mut() = Some(stop);
                Box::new(move || {
                    let stop = pending.borrow_mut().take();
                    if let Some(stop) = stop {
                        stop();
                    }
                })
            } else {
                on_change(&value);
                Box::new(|| {})
            }
        }
    }
}

/// Resolve a value whose resolved value yields a second static-or-stream
/// value.
///
/// The outer layer is resolved eagerly and without dedup; every outer
/// delivery projects the inner value, tears down the previous inner
/// resolution first, and resolves the new one with the caller's `dedupe` and
/// `lazy`. At most one inner resolution is live per binding, so a stale
/// inner can never deliver after the outer moved on.
pub fn resolve_nested<T, P>(
    handle: NodeHandle,
    value: MaybeObservable<T>,
    project: impl Fn(&T) -> MaybeObservable<P> + 'static,
    dedupe: bool,
    on_change: impl Fn(&P) + 'static,
    lazy: bool,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    P: Clone + PartialEq + 'static,
{
    let inner_stop: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let on_change: Rc<dyn Fn(&P)> = Rc::new(on_change);

    let inner = inner_stop.clone();
    let stop_outer = resolve(
        handle,
        value,
        false,
        move |outer_value: &T| {
            let previous = inner.borrow_mut().take();
            if let Some(stop) = previous {
                stop();
            }
            let inner_value = project(outer_value);
            let on_change = on_change.clone();
            let stop =
                resolve(handle, inner_value, dedupe, move |new_value: &P| on_change(new_value), lazy);
            *inner.borrow_mut() = Some(stop);
        },
        false,
    );

    Box::new(move || {
        stop_outer();
        let stop = inner_stop.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
        }
    })
}

// =============================================================================
// Latest-value adapter
// =============================================================================

/// Convert `value` into a latest-value signal container plus a stop.
///
/// A signal input is returned unchanged with a no-op stop. A stream input
/// feeds a new signal seeded with `initial`, updated only while the node is
/// mounted and only when the emission differs from the container's current
/// value. A static input yields a fixed signal holding the value itself
/// (`initial` only seeds streams, which have nothing to show yet).
pub fn to_signal<T>(handle: NodeHandle, value: MaybeObservable<T>, initial: T) -> (Signal<T>, Cleanup)
where
    T: Clone + PartialEq + 'static,
{
    match value {
        MaybeObservable::Signal(existing) => (existing, Box::new(|| {})),
        MaybeObservable::Static(value) => (signal(value), Box::new(|| {})),
        MaybeObservable::Stream(stream) => {
            let container = signal(initial);
            let forward = container.clone();
            let stop = while_mounted(handle, move || {
                let forward = forward.clone();
                stream.subscribe(Rc::new(move |new_value: &T| {
                    if *new_value != forward.get() {
                        forward.set(new_value.clone());
                    }
                }))
            });
            (container, stop)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{trigger_mount, trigger_unmount};
    use crate::node::{create_node, reset_nodes};

    fn collect<T: Clone + 'static>(values: &Rc<RefCell<Vec<T>>>) -> impl Fn(&T) + 'static {
        let values = values.clone();
        move |value: &T| values.borrow_mut().push(value.clone())
    }

    #[test]
    fn test_static_delivers_synchronously() {
        reset_nodes();
        let node = create_node();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let stop = resolve(node, MaybeObservable::from(5), true, collect(&seen), false);
        assert_eq!(*seen.borrow(), vec![5]);

        // No-op stop, and nothing more ever arrives.
        stop();
        trigger_mount(node);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_lazy_static_waits_for_mount_and_fires_once() {
        reset_nodes();
        let node = create_node();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _stop = resolve(node, MaybeObservable::from(5), true, collect(&seen), true);
        assert!(seen.borrow().is_empty());

        trigger_mount(node);
        assert_eq!(*seen.borrow(), vec![5]);

        // Self-unregistered: later mounts deliver nothing.
        trigger_unmount(node);
        trigger_mount(node);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_lazy_static_on_mounted_node_is_immediate() {
        reset_nodes();
        let node = create_node();
        trigger_mount(node);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _stop = resolve(node, MaybeObservable::from(5), true, collect(&seen), true);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_lazy_static_stop_before_mount_cancels() {
        reset_nodes();
        let node = create_node();
        let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));

        let stop = resolve(node, MaybeObservable::from(5), true, collect(&seen), true);
        stop();
        trigger_mount(node);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_stream_delegates_to_observe() {
        reset_nodes();
        let node = create_node();
        let subject: Subject<i32> = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _stop =
            resolve(node, MaybeObservable::from(subject.clone()), true, collect(&seen), false);
        trigger_mount(node);

        for value in [1, 1, 2] {
            subject.emit(&value);
        }
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_nested_follows_outer_changes() {
        reset_nodes();
        let node = create_node();
        trigger_mount(node);

        let outer: Subject<i32> = Subject::new();
        let stream_a: Subject<String> = Subject::new();
        let stream_b: Subject<String> = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let pick_a = stream_a.clone();
        let pick_b = stream_b.clone();
        let _stop = resolve_nested(
            node,
            MaybeObservable::from(outer.clone()),
            move |choice: &i32| {
                if *choice == 0 {
                    MaybeObservable::from(pick_a.clone())
                } else {
                    MaybeObservable::from(pick_b.clone())
                }
            },
            false,
            collect(&seen),
            false,
        );

        outer.emit(&0);
        stream_a.emit(&"a1".to_string());

        outer.emit(&1);
        // Stale inner fully torn down before the new one started.
        assert_eq!(stream_a.observer_count(), 0);
        assert_eq!(stream_b.observer_count(), 1);

        // Late emission on the old inner never reaches the callback.
        stream_a.emit(&"a2".to_string());
        stream_b.emit(&"b1".to_string());
        assert_eq!(*seen.borrow(), vec!["a1".to_string(), "b1".to_string()]);
    }

    #[test]
    fn test_nested_static_outer_static_inner() {
        reset_nodes();
        let node = create_node();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _stop = resolve_nested(
            node,
            MaybeObservable::from(3),
            |outer: &i32| MaybeObservable::from(outer * 10),
            true,
            collect(&seen),
            false,
        );
        assert_eq!(*seen.borrow(), vec![30]);
    }

    #[test]
    fn test_nested_stop_tears_down_both_layers() {
        reset_nodes();
        let node = create_node();
        trigger_mount(node);

        let outer: Subject<i32> = Subject::new();
        let inner: Subject<i32> = Subject::new();

        let inner_for_project = inner.clone();
        let stop = resolve_nested(
            node,
            MaybeObservable::from(outer.clone()),
            move |_: &i32| MaybeObservable::from(inner_for_project.clone()),
            false,
            |_: &i32| {},
            false,
        );

        outer.emit(&0);
        assert_eq!(outer.observer_count(), 1);
        assert_eq!(inner.observer_count(), 1);

        stop();
        assert_eq!(outer.observer_count(), 0);
        assert_eq!(inner.observer_count(), 0);
    }

    #[test]
    fn test_to_signal_passes_signal_through() {
        reset_nodes();
        let node = create_node();
        let existing = signal(4);

        let (container, _stop) =
            to_signal(node, MaybeObservable::from(existing.clone()), 0);
        existing.set(9);
        assert_eq!(container.get(), 9);
    }

    #[test]
    fn test_to_signal_forwards_stream_while_mounted() {
        reset_nodes();
        let node = create_node();
        let subject: Subject<i32> = Subject::new();

        let (container, _stop) =
            to_signal(node, MaybeObservable::from(subject.clone()), 0);
        assert_eq!(container.get(), 0);

        // Not mounted: emissions do not reach the container.
        subject.emit(&1);
        assert_eq!(container.get(), 0);

        trigger_mount(node);
        subject.emit(&2);
        assert_eq!(container.get(), 2);

        trigger_unmount(node);
        subject.emit(&3);
        assert_eq!(container.get(), 2);
    }

    #[test]
    fn test_to_signal_static_adopts_value() {
        reset_nodes();
        let node = create_node();

        let (container, _stop) = to_signal(node, MaybeObservable::from(42), 0);
        assert_eq!(container.get(), 42);
    }
}
