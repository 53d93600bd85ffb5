//! Node registry - handle arena and per-node hook records.
//!
//! Nodes are created and destroyed by an external attachment mechanism; this
//! crate only associates data with them. Handles are generational indices
//! into a thread-local slot arena, so a handle that outlives its node reads
//! as "no record" everywhere instead of touching a reused slot.
//!
//! The record holds everything the hook modules key off a node: the attached
//! interface object, the lazily created lifecycle record, and the parent
//! link used by the outside-event containment test.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, destroy_node, set_parent};
//!
//! let parent = create_node();
//! let child = create_node();
//! set_parent(child, Some(parent));
//!
//! assert!(parent.contains(child));
//!
//! destroy_node(child);
//! assert!(!child.is_alive());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::lifecycle::Lifecycle;

// =============================================================================
// Handle
// =============================================================================

/// Opaque reference to one UI node, owned elsewhere.
///
/// Cheap to copy and safe to hold forever: once the node is destroyed the
/// handle simply stops resolving to a record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Whether the node behind this handle still exists.
    pub fn is_alive(self) -> bool {
        with_record(self, |_| ()).is_some()
    }

    /// Parent link recorded by the external attachment mechanism.
    pub fn parent(self) -> Option<NodeHandle> {
        with_record(self, |record| record.parent).flatten()
    }

    /// Subtree containment test: does `other` sit at or below this node?
    ///
    /// A node contains itself. Walks the parent links set via [`set_parent`].
    pub fn contains(self, other: NodeHandle) -> bool {
        let mut current = Some(other);
        while let Some(node) = current {
            if node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

// =============================================================================
// Records
// =============================================================================

/// Per-node hook storage. Dropped whole when the node is destroyed.
#[derive(Default)]
pub(crate) struct NodeRecord {
    /// The single attached capability object (see `interface`).
    pub(crate) interface: Option<Rc<dyn Any>>,
    /// Created lazily on the first lifecycle-related call.
    pub(crate) lifecycle: Option<Lifecycle>,
    /// Set by the external attachment mechanism, never derived.
    pub(crate) parent: Option<NodeHandle>,
}

struct Slot {
    generation: u32,
    record: Option<NodeRecord>,
}

thread_local! {
    /// Slot arena, one entry per node index ever allocated.
    static NODES: RefCell<Vec<Slot>> = const { RefCell::new(Vec::new()) };

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocate a fresh node handle.
///
/// Called by the external attachment mechanism when a node comes into
/// existence, never by hook consumers.
pub fn create_node() -> NodeHandle {
    let handle = NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();

        let reused = FREE_INDICES.with(|free| free.borrow_mut().pop());
        match reused {
            Some(index) => {
                let slot = &mut nodes[index as usize];
                slot.record = Some(NodeRecord::default());
                NodeHandle { index, generation: slot.generation }
            }
            None => {
                let index = nodes.len() as u32;
                nodes.push(Slot { generation: 0, record: Some(NodeRecord::default()) });
                NodeHandle { index, generation: 0 }
            }
        }
    });

    trace!(?handle, "node created");
    handle
}

/// Destroy a node, dropping its record.
///
/// Interface object, lifecycle listeners, and parent link all go with it.
/// Stale handles keep working as "absent": no-op here, `None`/no-op in every
/// other operation.
pub fn destroy_node(handle: NodeHandle) {
    let destroyed = NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        let Some(slot) = nodes.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.record.is_none() {
            return false;
        }
        slot.record = None;
        slot.generation += 1;
        true
    });

    if destroyed {
        FREE_INDICES.with(|free| free.borrow_mut().push(handle.index));
        trace!(?handle, "node destroyed");
    }
}

/// Record `child`'s parent link (or clear it with `None`).
///
/// Called by the external attachment mechanism when it moves nodes around.
/// Links are expected to form a tree.
pub fn set_parent(child: NodeHandle, parent: Option<NodeHandle>) {
    with_record(child, |record| {
        record.parent = parent;
    });
}

/// Run `f` against the node's record, or return `None` for a dead handle.
///
/// The registry borrow is held for the duration of `f`, so `f` must never
/// call back into user code.
pub(crate) fn with_record<R>(handle: NodeHandle, f: impl FnOnce(&mut NodeRecord) -> R) -> Option<R> {
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        let slot = nodes.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.record.as_mut().map(f)
    })
}

/// Reset all node state (for testing).
pub fn reset_nodes() {
    NODES.with(|nodes| nodes.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
}
