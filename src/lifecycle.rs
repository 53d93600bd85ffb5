//! Lifecycle signal - mount/unmount listeners and triggers.
//!
//! Mount and unmount are facts pushed in by the external attachment
//! mechanism via [`trigger_mount`] / [`trigger_unmount`]; nothing here polls
//! a tree for presence. The recorded state only reflects which trigger fired
//! last - do not use it to check whether a node is actually attached.
//!
//! Dispatch iterates a snapshot of the listener list taken when the trigger
//! fires: listeners registered during a pass run from the next trigger on,
//! and removals during a pass cannot skip unrelated listeners.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, on_mount, trigger_mount};
//!
//! let node = create_node();
//! let stop = on_mount(node, || println!("mounted"));
//!
//! // In the real app the attachment mechanism calls this.
//! trigger_mount(node);
//!
//! stop();
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::node::{self, NodeHandle};

// =============================================================================
// Types
// =============================================================================

/// Cleanup function returned by every registration API.
///
/// Call it to undo the registration. `FnOnce`, so a second call is
/// unrepresentable.
pub type Cleanup = Box<dyn FnOnce()>;

/// The last lifecycle trigger that fired for a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MountState {
    /// No trigger has fired yet.
    #[default]
    Unset,
    Mounted,
    Unmounted,
}

type Listener = Rc<dyn Fn()>;

/// Per-node lifecycle record, created lazily on the first lifecycle call.
#[derive(Default)]
pub(crate) struct Lifecycle {
    mount: Vec<(u64, Listener)>,
    unmount: Vec<(u64, Listener)>,
    mount_state: MountState,
}

thread_local! {
    /// Registration ids double as the removal identity.
    static NEXT_LISTENER_ID: Cell<u64> = const { Cell::new(0) };
}

fn next_listener_id() -> u64 {
    NEXT_LISTENER_ID.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        id
    })
}

// =============================================================================
// Registration
// =============================================================================

fn register(handle: NodeHandle, on_mount_phase: bool, listener: Listener) -> Cleanup {
    let id = next_listener_id();
    node::with_record(handle, |record| {
        let lifecycle = record.lifecycle.get_or_insert_with(Lifecycle::default);
        let list = if on_mount_phase { &mut lifecycle.mount } else { &mut lifecycle.unmount };
        list.push((id, listener));
    });

    Box::new(move || {
        node::with_record(handle, |record| {
            if let Some(lifecycle) = record.lifecycle.as_mut() {
                let list = if on_mount_phase { &mut lifecycle.mount } else { &mut lifecycle.unmount };
                list.retain(|(listener_id, _)| *listener_id != id);
            }
        });
    })
}

/// Register a mount listener. Returns a cleanup that removes exactly this
/// registration.
pub fn on_mount(handle: NodeHandle, listener: impl Fn() + 'static) -> Cleanup {
    register(handle, true, Rc::new(listener))
}

/// Register an unmount listener. Returns a cleanup that removes exactly this
/// registration.
pub fn on_unmount(handle: NodeHandle, listener: impl Fn() + 'static) -> Cleanup {
    register(handle, false, Rc::new(listener))
}

// =============================================================================
// Triggers
// =============================================================================

/// Snapshot the relevant listener list if the trigger is a real transition.
///
/// Returns `None` when the trigger is redundant (or the handle is dead), so
/// the caller can skip dispatch entirely.
fn transition(handle: NodeHandle, to: MountState) -> Option<Vec<Listener>> {
    node::with_record(handle, |record| {
        let lifecycle = record.lifecycle.get_or_insert_with(Lifecycle::default);
        let allowed = match to {
            MountState::Mounted => lifecycle.mount_state != MountState::Mounted,
            // Unmount only undoes an actual mount; a never-mounted node stays unset.
            _ => lifecycle.mount_state == MountState::Mounted,
        };
        if !allowed {
            return None;
        }
        lifecycle.mount_state = to;
        let list = if to == MountState::Mounted { &lifecycle.mount } else { &lifecycle.unmount };
        Some(list.iter().map(|(_, listener)| listener.clone()).collect())
    })?
}

/// Fire the node's mount listeners, in registration order.
///
/// No-op if the last trigger was already a mount.
pub fn trigger_mount(handle: NodeHandle) {
    match transition(handle, MountState::Mounted) {
        Some(listeners) => {
            trace!(?handle, listeners = listeners.len(), "mount triggered");
            for listener in listeners {
                listener();
            }
        }
        None => debug!(?handle, "redundant mount trigger ignored"),
    }
}

/// Fire the node's unmount listeners, in registration order.
///
/// No-op if the node is already unmounted or was never mounted.
pub fn trigger_unmount(handle: NodeHandle) {
    match transition(handle, MountState::Unmounted) {
        Some(listeners) => {
            trace!(?handle, listeners = listeners.len(), "unmount triggered");
            for listener in listeners {
                listener();
            }
        }
        None => debug!(?handle, "redundant unmount trigger ignored"),
    }
}

/// The last lifecycle trigger that fired for this node.
///
/// [`MountState::Unset`] for untouched and for dead handles. This is not a
/// proxy for actual presence in the tree.
pub fn mount_state(handle: NodeHandle) -> MountState {
    node::with_record(handle, |record| {
        record.lifecycle.as_ref().map(|lifecycle| lifecycle.mount_state).unwrap_or_default()
    })
    .unwrap_or_default()
}
