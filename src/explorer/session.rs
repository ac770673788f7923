//! One viewer session, tying the core pieces together.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use log::{debug, info, warn};

use super::error::{FetchError, TraversalError};
use super::fetch::{Disposition, FetchCoordinator, FetchOutcome, GraphSource, PendingFetch};
use super::selection::{Inspection, PointerHit, SelectionModel};
use super::store::GraphStore;
use super::traversal::{
	Depth, FetchDirective, StoreEffect, Transition, TraversalMode, TraversalState,
};
use super::types::{EdgeId, GraphFragment, NodeId};

/// Non-blocking indicator of the latest fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
	/// Nothing outstanding.
	#[default]
	Idle,
	/// A fetch has been issued and not yet completed.
	Loading,
	/// The latest fetch failed; carries the error message.
	Failed(String),
}

/// What happened to a fetch result handed to [`ExplorerSession::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
	/// The fragment was merged.
	Merged {
		/// Nodes in the fragment.
		nodes: usize,
		/// Edges in the fragment.
		edges: usize,
	},
	/// The ticket was superseded; nothing was merged.
	Stale,
	/// The fetch failed; the store is untouched.
	Failed(FetchError),
}

/// One viewer session: the store with the traversal, selection and fetch
/// state that drive it.
///
/// Every interaction is applied synchronously. Methods that need remote data
/// return the [`PendingFetch`] to await; hand its outcome back through
/// [`Self::complete`] (or use [`drive`]).
pub struct ExplorerSession<S> {
	store: GraphStore,
	traversal: TraversalState,
	selection: SelectionModel,
	fetcher: FetchCoordinator<S>,
	status: FetchStatus,
}

impl<S: GraphSource> ExplorerSession<S> {
	/// A session with an empty store, focused on `root`. Nothing is fetched
	/// until [`Self::start`].
	pub fn new(source: S, mode: TraversalMode, root: impl Into<String>) -> Self {
		Self {
			store: GraphStore::new(),
			traversal: TraversalState::new(mode, root),
			selection: SelectionModel::default(),
			fetcher: FetchCoordinator::new(source),
			status: FetchStatus::Idle,
		}
	}

	/// Everything discovered so far.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// Mutable store access, for subscribing observers.
	pub fn store_mut(&mut self) -> &mut GraphStore {
		&mut self.store
	}

	/// Current mode, root, focus and depth.
	pub fn traversal(&self) -> &TraversalState {
		&self.traversal
	}

	/// Selection and panel state.
	pub fn selection(&self) -> &SelectionModel {
		&self.selection
	}

	/// Indicator of the latest fetch.
	pub fn status(&self) -> &FetchStatus {
		&self.status
	}

	/// The fetch coordinator, mostly for inspecting tickets.
	pub fn fetcher(&self) -> &FetchCoordinator<S> {
		&self.fetcher
	}

	/// Attribute view of the selected element, if it is stored.
	pub fn inspect(&self) -> Option<Inspection> {
		self.selection.inspect(&self.store)
	}

	/// Initial fetch for the configured mode and root.
	pub fn start(&mut self) -> Option<PendingFetch> {
		let transition = self.traversal.on_start();
		self.apply(transition)
	}

	/// Switches mode: clears the store and refetches from the root at depth
	/// 1. The current mode again is a no-op.
	pub fn set_mode(&mut self, mode: TraversalMode) -> Option<PendingFetch> {
		let transition = self.traversal.on_mode_change(mode);
		self.apply(transition)
	}

	/// New neighborhood depth around the current focus. Rejected in Full
	/// mode.
	pub fn set_depth(&mut self, depth: Depth) -> Result<Option<PendingFetch>, TraversalError> {
		let transition = self.traversal.on_depth_change(depth)?;
		Ok(self.apply(transition))
	}

	/// "Reset Graph": clear and refetch from the root at depth 1. No-op in
	/// Full mode or with a single stored node.
	pub fn reset_graph(&mut self) -> Option<PendingFetch> {
		let transition = self.traversal.on_reset(self.store.node_count());
		self.apply(transition)
	}

	/// Re-issues the current key, ignoring anything cached.
	pub fn refresh(&mut self) -> Option<PendingFetch> {
		let transition = self.traversal.on_refresh();
		self.apply(transition)
	}

	/// Left click on the canvas.
	pub fn click(&mut self, hit: &PointerHit) {
		self.selection.on_click(hit);
	}

	/// Right click on the canvas.
	pub fn context_click(&mut self, hit: &PointerHit) {
		self.selection.on_context(hit);
	}

	/// A node under the pointer advances traversal (topmost node if several).
	/// Nothing under it closes the inspection panel.
	pub fn double_click(&mut self, hit: &PointerHit) -> Option<PendingFetch> {
		if let Some(node) = hit.nodes.first() {
			let transition = self.traversal.on_node_double_click(node);
			return self.apply(transition);
		}
		if hit.is_empty() {
			self.selection.close_panel();
		}
		None
	}

	/// Shows the inspection panel.
	pub fn open_panel(&mut self) {
		self.selection.open_panel();
	}

	/// Hides the inspection panel and drops the selection.
	pub fn close_panel(&mut self) {
		self.selection.close_panel();
	}

	fn apply(&mut self, transition: Transition) -> Option<PendingFetch> {
		let Transition { next, store, fetch } = transition;
		if next != self.traversal {
			debug!(
				"traversal {} -> {}",
				self.traversal.fetch_key(),
				next.fetch_key()
			);
		}
		self.traversal = next;

		match store {
			StoreEffect::Keep => {}
			StoreEffect::Clear => self.store.clear(),
			StoreEffect::PruneExcept(keep) => self.store.remove_nodes_except(&keep),
		}
		self.selection.retain_existing(&self.store);

		let pending = match fetch {
			FetchDirective::None => return None,
			FetchDirective::Fetch(key) => self.fetcher.request(key),
			FetchDirective::Refetch(key) => {
				self.fetcher.invalidate();
				self.fetcher.request(key)
			}
		};
		match &pending.disposition {
			Disposition::Issued => {
				self.status = FetchStatus::Loading;
				Some(pending)
			}
			Disposition::Coalesced => None,
			Disposition::Cached(fragment) => {
				let fragment = Rc::clone(fragment);
				self.status = FetchStatus::Idle;
				self.merge(&fragment);
				None
			}
		}
	}

	/// Applies the result of an issued fetch. Results for anything but the
	/// current ticket are dropped, and failures leave the store untouched.
	pub fn complete(&mut self, pending: &PendingFetch, outcome: FetchOutcome) -> MergeOutcome {
		if !self.fetcher.is_current(pending) {
			debug!("fetch {}: discarding stale result", pending.key);
			return MergeOutcome::Stale;
		}
		match outcome {
			Ok(fragment) => {
				self.status = FetchStatus::Idle;
				self.merge(&fragment);
				info!(
					"fetch {}: merged {} nodes, {} edges ({} / {} stored)",
					pending.key,
					fragment.nodes.len(),
					fragment.edges.len(),
					self.store.node_count(),
					self.store.edge_count()
				);
				MergeOutcome::Merged {
					nodes: fragment.nodes.len(),
					edges: fragment.edges.len(),
				}
			}
			Err(err) => {
				warn!("fetch {} failed: {err}", pending.key);
				self.status = FetchStatus::Failed(err.to_string());
				MergeOutcome::Failed(err)
			}
		}
	}

	fn merge(&mut self, fragment: &GraphFragment) {
		self.store.merge(fragment);
		if self.traversal.prunes() {
			let mut nodes: BTreeSet<NodeId> = fragment.nodes.iter().map(|n| n.id.clone()).collect();
			nodes.insert(self.traversal.focus.clone());
			let edges: BTreeSet<EdgeId> = fragment.edges.iter().map(|e| e.id.clone()).collect();
			self.store.retain_only(&nodes, &edges);
		}
		self.selection.retain_existing(&self.store);
	}
}

/// Awaits `pending` and applies its outcome to the shared session. The
/// session is only borrowed after the fetch resolves.
pub async fn drive<S: GraphSource>(
	session: Rc<RefCell<ExplorerSession<S>>>,
	pending: PendingFetch,
) -> MergeOutcome {
	let outcome = pending.outcome().await;
	session.borrow_mut().complete(&pending, outcome)
}
