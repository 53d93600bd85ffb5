//! Interface binding - attach a capability object to a node.
//!
//! Lets unrelated code paths ask a node "do you support capability X?"
//! without inheritance: a node carries at most one attached object, stored
//! type-erased and downcast on read. Setting a new one silently replaces the
//! previous. Absence is always `None`, never an error - including reads
//! through a dead handle and reads at the wrong type.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{attach_interface, create_node, get_interface};
//!
//! struct Toggle { open: std::cell::Cell<bool> }
//!
//! let node = create_node();
//! // Keep the returned handle: it is the one statically known to carry Toggle.
//! let toggle = attach_interface(node, Toggle { open: false.into() });
//!
//! toggle.get().unwrap().open.set(true);
//! assert!(get_interface::<Toggle>(node).is_some());
//! ```

use std::any::Any;
use std::marker::PhantomData;
use std::ops::Deref;
use std::rc::Rc;

use crate::node::{self, NodeHandle};

/// A node handle statically known to carry a capability of type `T`.
///
/// Purely a compile-time marker over the same [`NodeHandle`]; the record can
/// still disappear (node destroyed, interface replaced at another type), so
/// [`InterfaceHandle::get`] stays fallible.
pub struct InterfaceHandle<T> {
    node: NodeHandle,
    _interface: PhantomData<T>,
}

impl<T: 'static> InterfaceHandle<T> {
    /// The underlying untyped handle.
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// The attached capability object, if still present at type `T`.
    pub fn get(&self) -> Option<Rc<T>> {
        get_interface(self.node)
    }
}

impl<T> Clone for InterfaceHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InterfaceHandle<T> {}

impl<T> Deref for InterfaceHandle<T> {
    type Target = NodeHandle;

    fn deref(&self) -> &NodeHandle {
        &self.node
    }
}

/// Attach `object` as the node's sole capability, replacing any previous one.
///
/// Returns the typed handle; keep using it where the capability type matters.
/// On a dead handle the object is dropped and the returned handle reads as
/// absent.
pub fn attach_interface<T: 'static>(handle: NodeHandle, object: T) -> InterfaceHandle<T> {
    let object: Rc<dyn Any> = Rc::new(object);
    node::with_record(handle, move |record| {
        record.interface = Some(object);
    });
    InterfaceHandle { node: handle, _interface: PhantomData }
}

/// The currently attached capability object, if any and if it is a `T`.
pub fn get_interface<T: 'static>(handle: NodeHandle) -> Option<Rc<T>> {
    let object = node::with_record(handle, |record| record.interface.clone())??;
    object.downcast::<T>().ok()
}

/// Whether any capability object is attached, regardless of its type.
pub fn has_interface(handle: NodeHandle) -> bool {
    node::with_record(handle, |record| record.interface.is_some()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{create_node, destroy_node, reset_nodes};

    struct Counter {
        value: i32,
    }

    struct Other;

    #[test]
    fn test_attach_get_has() {
        reset_nodes();
        let node = create_node();
        assert!(!has_interface(node));

        let typed = attach_interface(node, Counter { value: 7 });
        assert!(has_interface(node));
        assert_eq!(typed.get().unwrap().value, 7);
        assert_eq!(get_interface::<Counter>(node).unwrap().value, 7);
    }

    #[test]
    fn test_attach_replaces_previous() {
        reset_nodes();
        let node = create_node();

        let first = attach_interface(node, Counter { value: 1 });
        attach_interface(node, Other);

        // Replaced at a different type: the old typed handle reads absent.
        assert!(first.get().is_none());
        assert!(get_interface::<Other>(node).is_some());
        assert!(has_interface(node));
    }

    #[test]
    fn test_wrong_type_reads_none() {
        reset_nodes();
        let node = create_node();
        attach_interface(node, Counter { value: 1 });
        assert!(get_interface::<Other>(node).is_none());
    }

    #[test]
    fn test_dead_handle_reads_absent() {
        reset_nodes();
        let node = create_node();
        destroy_node(node);

        let typed = attach_interface(node, Counter { value: 1 });
        assert!(typed.get().is_none());
        assert!(!has_interface(node));
    }
}
