//! Mount-scoped effect - setup on mount, teardown on the matching unmount.
//!
//! The one primitive the event and observable wrappers are built on. The
//! setup closure runs on every mount and returns the teardown for that
//! cycle; the teardown runs on the matching unmount, never twice. If the
//! node is already mounted at registration time, setup runs immediately, so
//! late-registering consumers observe current state without waiting for a
//! future mount.
//!
//! # Example
//!
//! ```ignore
//! use node_hooks::{create_node, trigger_mount, while_mounted};
//!
//! let node = create_node();
//! let stop = while_mounted(node, || {
//!     let timer = start_timer();
//!     Box::new(move || timer.cancel())
//! });
//!
//! trigger_mount(node); // setup runs, timer starts
//! stop();              // pending teardown runs, timer cancelled
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::lifecycle::{Cleanup, MountState, mount_state, on_mount, on_unmount};
use crate::node::NodeHandle;

/// Pair `setup` with its returned teardown across the node's mount cycles.
///
/// The returned cleanup unregisters both internal listeners and, if a
/// teardown is pending (mounted, not yet unmounted), runs it immediately -
/// no leaked resource regardless of when it is called.
pub fn while_mounted(handle: NodeHandle, setup: impl FnMut() -> Cleanup + 'static) -> Cleanup {
    let setup = Rc::new(RefCell::new(setup));
    let teardown: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));

    let run_setup = {
        let setup = setup.clone();
        let teardown = teardown.clone();
        move || {
            let next = (&mut *setup.borrow_mut())();
            *teardown.borrow_mut() = Some(next);
        }
    };

    let run_teardown = {
        let teardown = teardown.clone();
        move || {
            let pending = teardown.borrow_mut().take();
            if let Some(teardown) = pending {
                teardown();
            }
        }
    };

    let stop_mount = on_mount(handle, run_setup.clone());
    let stop_unmount = on_unmount(handle, run_teardown.clone());

    // Replay for late registration on an already-mounted node.
    if mount_state(handle) == MountState::Mounted {
        run_setup();
    }

    Box::new(move || {
        stop_mount();
        stop_unmount();
        run_teardown();
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::lifecycle::{trigger_mount, trigger_unmount};
    use crate::node::{create_node, reset_nodes};

    fn counting_effect(
        node: NodeHandle,
        setups: &Rc<Cell<u32>>,
        teardowns: &Rc<Cell<u32>>,
    ) -> Cleanup {
        let setups = setups.clone();
        let teardowns = teardowns.clone();
        while_mounted(node, move || {
            setups.set(setups.get() + 1);
            let teardowns = teardowns.clone();
            Box::new(move || teardowns.set(teardowns.get() + 1))
        })
    }

    #[test]
    fn test_setup_teardown_pairing() {
        reset_nodes();
        let node = create_node();
        let setups = Rc::new(Cell::new(0));
        let teardowns = Rc::new(Cell::new(0));
        let _stop = counting_effect(node, &setups, &teardowns);

        trigger_mount(node);
        assert_eq!((setups.get(), teardowns.get()), (1, 0));

        trigger_unmount(node);
        assert_eq!((setups.get(), teardowns.get()), (1, 1));

        trigger_mount(node);
        trigger_unmount(node);
        assert_eq!((setups.get(), teardowns.get()), (2, 2));
    }

    #[test]
    fn test_late_registration_replays_once() {
        reset_nodes();
        let node = create_node();
        trigger_mount(node);

        let setups = Rc::new(Cell::new(0));
        let teardowns = Rc::new(Cell::new(0));
        let _stop = counting_effect(node, &setups, &teardowns);

        // Setup ran synchronously at registration.
        assert_eq!(setups.get(), 1);

        // A redundant mount trigger adds nothing.
        trigger_mount(node);
        assert_eq!(setups.get(), 1);

        trigger_unmount(node);
        assert_eq!(teardowns.get(), 1);
    }

    #[test]
    fn test_stop_while_mounted_runs_pending_teardown() {
        reset_nodes();
        let node = create_node();
        let setups = Rc::new(Cell::new(0));
        let teardowns = Rc::new(Cell::new(0));
        let stop = counting_effect(node, &setups, &teardowns);

        trigger_mount(node);
        stop();
        assert_eq!((setups.get(), teardowns.get()), (1, 1));

        // Stopped: later cycles no longer touch the effect.
        trigger_unmount(node);
        trigger_mount(node);
        assert_eq!((setups.get(), teardowns.get()), (1, 1));
    }

    #[test]
    fn test_stop_before_mount_is_silent() {
        reset_nodes();
        let node = create_node();
        let setups = Rc::new(Cell::new(0));
        let teardowns = Rc::new(Cell::new(0));
        let stop = counting_effect(node, &setups, &teardowns);

        stop();
        trigger_mount(node);
        assert_eq!((setups.get(), teardowns.get()), (0, 0));
    }

    #[test]
    fn test_unmount_without_setup_is_silent() {
        reset_nodes();
        let node = create_node();
        trigger_mount(node);
        trigger_unmount(node);

        let setups = Rc::new(Cell::new(0));
        let teardowns = Rc::new(Cell::new(0));
        let _stop = counting_effect(node, &setups, &teardowns);

        // Registered while unmounted: nothing pending, nothing to tear down.
        trigger_unmount(node);
        assert_eq!((setups.get(), teardowns.get()), (0, 0));
    }
}
