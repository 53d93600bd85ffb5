//! Event targets and mount-scoped listeners.
//!
//! Targets are external: anything with a listen/unlisten pair satisfies
//! [`EventTarget`]. [`listen_while_mounted`] keeps a listener attached for
//! exactly the node's mounted intervals; [`on_outside_event`] additionally
//! drops events originating inside the node's own subtree, which is how
//! popups and dropdowns close on a click elsewhere.
//!
//! [`EventBus`] is the bundled target implementation - the stand-in for a
//! global window object - with the usual snapshot-dispatch listener registry.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, listen_while_mounted, trigger_mount, EventBus, PointerEvent};
//! use std::rc::Rc;
//!
//! let bus: EventBus<PointerEvent> = EventBus::new();
//! let node = create_node();
//!
//! let stop = listen_while_mounted(node, &bus, "pointerdown", Rc::new(|event| {
//!     println!("pressed at {},{}", event.column, event.row);
//! }));
//!
//! trigger_mount(node); // listener attached
//! bus.emit("pointerdown", &PointerEvent::at(None, 3, 4));
//! stop();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::effect::while_mounted;
use crate::lifecycle::Cleanup;
use crate::node::NodeHandle;

// =============================================================================
// Contracts
// =============================================================================

/// Event listener callback (Rc so one registration can be detached later by
/// identity, DOM-style).
pub type EventListener<E> = Rc<dyn Fn(&E)>;

/// An external object events can be attached to.
///
/// `unlisten` removes by listener identity (`Rc::ptr_eq`); unknown listeners
/// are a no-op.
pub trait EventTarget {
    type Event;

    fn listen(&self, event: &str, listener: EventListener<Self::Event>);
    fn unlisten(&self, event: &str, listener: &EventListener<Self::Event>);
}

/// Events that know which node they originated from.
///
/// Required by [`on_outside_event`] for the containment test.
pub trait HasOrigin {
    fn origin(&self) -> Option<NodeHandle>;
}

// =============================================================================
// Event Bus
// =============================================================================

/// Listener registry usable as a global event target.
///
/// Clones share the same registry. Dispatch iterates a snapshot, so handlers
/// may listen/unlisten freely during a pass.
pub struct EventBus<E> {
    listeners: Rc<RefCell<HashMap<String, Vec<EventListener<E>>>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self { listeners: self.listeners.clone() }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self { listeners: Rc::new(RefCell::new(HashMap::new())) }
    }

    /// Dispatch `payload` to every listener registered for `event`.
    pub fn emit(&self, event: &str, payload: &E) {
        let snapshot: Vec<EventListener<E>> =
            self.listeners.borrow().get(event).cloned().unwrap_or_default();
        for listener in snapshot {
            listener(payload);
        }
    }

    /// Number of listeners currently attached for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, |list| list.len())
    }
}

impl<E> EventTarget for EventBus<E> {
    type Event = E;

    fn listen(&self, event: &str, listener: EventListener<E>) {
        self.listeners.borrow_mut().entry(event.to_string()).or_default().push(listener);
    }

    fn unlisten(&self, event: &str, listener: &EventListener<E>) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(event) {
            if let Some(position) = list.iter().position(|known| Rc::ptr_eq(known, listener)) {
                list.remove(position);
            }
            if list.is_empty() {
                listeners.remove(event);
            }
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Pointer event payload for [`EventBus`] targets.
#[derive(Clone, Debug, Default)]
pub struct PointerEvent {
    /// Node the event originated from, when known.
    pub origin: Option<NodeHandle>,
    pub column: u16,
    pub row: u16,
}

impl PointerEvent {
    pub fn new(origin: Option<NodeHandle>) -> Self {
        Self { origin, column: 0, row: 0 }
    }

    pub fn at(origin: Option<NodeHandle>, column: u16, row: u16) -> Self {
        Self { origin, column, row }
    }
}

impl HasOrigin for PointerEvent {
    fn origin(&self) -> Option<NodeHandle> {
        self.origin
    }
}

// =============================================================================
// Mount-scoped listeners
// =============================================================================

/// Keep `listener` attached to `target` for `event` while the node is
/// mounted.
///
/// Attach on mount, detach on unmount; the returned cleanup detaches
/// immediately if currently attached.
pub fn listen_while_mounted<T>(
    handle: NodeHandle,
    target: &T,
    event: &str,
    listener: EventListener<T::Event>,
) -> Cleanup
where
    T: EventTarget + Clone + 'static,
    T::Event: 'static,
{
    let target = target.clone();
    let event = event.to_string();
    while_mounted(handle, move || {
        target.listen(&event, listener.clone());
        let target = target.clone();
        let event = event.clone();
        let listener = listener.clone();
        Box::new(move || target.unlisten(&event, &listener))
    })
}

/// Like [`listen_while_mounted`], but only forwards events originating
/// outside the subtree rooted at `handle`.
///
/// An event with no origin counts as outside.
pub fn on_outside_event<T>(
    handle: NodeHandle,
    target: &T,
    event: &str,
    listener: EventListener<T::Event>,
) -> Cleanup
where
    T: EventTarget + Clone + 'static,
    T::Event: HasOrigin + 'static,
{
    let filtered: EventListener<T::Event> = Rc::new(move |event: &T::Event| {
        let inside = event.origin().is_some_and(|origin| handle.contains(origin));
        if !inside {
            listener(event);
        }
    });
    listen_while_mounted(handle, target, event, filtered)
}
