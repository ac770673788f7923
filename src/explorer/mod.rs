//! Framework-agnostic graph exploration core.
//!
//! - [`store::GraphStore`]: upsert-by-id store of everything discovered,
//!   observable by rendering surfaces.
//! - [`traversal`]: the Full / Step / Focus state machine.
//! - [`selection::SelectionModel`]: single node-or-edge selection and the
//!   inspection view over it.
//! - [`fetch::FetchCoordinator`]: coalescing, caching and stale-result
//!   suppression for remote fetches.
//! - [`session::ExplorerSession`]: all of the above for one viewer.

pub mod error;
pub mod fetch;
pub mod selection;
pub mod session;
pub mod store;
pub mod traversal;
pub mod types;

pub use error::{FetchError, MergeSkip, TraversalError};
pub use fetch::{Disposition, FetchCoordinator, FetchOutcome, GraphSource, PendingFetch};
pub use selection::{AttributeRow, ElementKind, Inspection, PointerHit, Selection, SelectionModel};
pub use session::{ExplorerSession, FetchStatus, MergeOutcome, drive};
pub use store::{GraphStore, StoreChange, StoreObserver, SubscriptionId};
pub use traversal::{
	Depth, FetchDirective, FetchKey, StoreEffect, Transition, TraversalMode, TraversalState,
};
pub use types::{Attributes, Edge, EdgeId, GraphFragment, Node, NodeId, RawFragment, last_segment};
