//! # node-hooks
//!
//! Lifecycle hooks and reactive bindings for externally managed UI nodes.
//!
//! The crate binds auxiliary, strongly-typed behavior to opaque node handles
//! whose creation and destruction it does not control: a per-node capability
//! table, a manually propagated mount/unmount lifecycle signal, and
//! lifecycle-scoped subscriptions to external event targets and value
//! streams.
//!
//! These hooks only work when the external attachment mechanism reports
//! presence changes through [`trigger_mount`] / [`trigger_unmount`]. The
//! core never polls a tree; it is a passive state machine reacting to those
//! two signals.
//!
//! ## Architecture
//!
//! Everything layers on the node registry and the lifecycle signal:
//!
//! ```text
//! node registry → interface / lifecycle → while_mounted → {events, observables} → resolve
//! ```
//!
//! ## Modules
//!
//! - [`node`] - Handle arena, parent links, per-node hook records
//! - [`interface`] - Attach/query a capability object on a node
//! - [`lifecycle`] - Mount/unmount listeners and triggers
//! - [`effect`] - Mount-scoped setup/teardown pairing
//! - [`events`] - Event targets and mount-scoped listeners
//! - [`observable`] - Push streams and mount-scoped subscription
//! - [`resolve`] - Static-or-stream resolution and latest-value adapters

pub mod effect;
pub mod events;
pub mod interface;
pub mod lifecycle;
pub mod node;
pub mod observable;
pub mod resolve;

// Re-export commonly used items

pub use node::{NodeHandle, create_node, destroy_node, reset_nodes, set_parent};

pub use interface::{InterfaceHandle, attach_interface, get_interface, has_interface};

pub use lifecycle::{
    Cleanup, MountState, mount_state, on_mount, on_unmount, trigger_mount, trigger_unmount,
};

pub use effect::while_mounted;

pub use events::{
    EventBus, EventListener, EventTarget, HasOrigin, PointerEvent, listen_while_mounted,
    on_outside_event,
};

pub use observable::{Observable, Observer, Subject, observe_while_mounted};

pub use resolve::{MaybeObservable, resolve, resolve_nested, to_signal};
